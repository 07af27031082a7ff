//! CLI commands. Each one navigates to its route first and stops there when
//! the guard redirects.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;

use sca_auth::{Permission, Session, explain_authorization};
use sca_core::{
    AssetId, AssetStatusId, AuditLogId, DepartmentId, EquipmentTypeId, ListParams, LocationId,
    MovementId,
};
use sca_inventory::{AssetInput, AssetPatch, LocationInput, MoveRequest};
use sca_navigation::Location;

use sca_client::App;

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "SCA_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Path to open after signing in
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user, role and permissions
    Whoami {
        /// Also ask the server whether the access token is still valid
        #[arg(long)]
        verify: bool,
    },

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Run a navigation through the route guard and report where it ends
    Navigate { path: String },

    /// Hospital assets
    #[command(subcommand)]
    Assets(AssetsCommand),

    /// Locations
    #[command(subcommand)]
    Locations(LocationsCommand),

    /// Movement history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Audit log
    #[command(subcommand)]
    Audit(AuditCommand),
}

#[derive(Args, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    search: Option<String>,

    /// Ordering field, e.g. `-fecha_alta`
    #[arg(long)]
    ordering: Option<String>,

    /// Extra filter as key=value (repeatable)
    #[arg(long = "filter", value_parser = parse_key_val)]
    filters: Vec<(String, String)>,
}

impl ListArgs {
    fn params(&self) -> ListParams {
        let mut params = ListParams::new();
        if let Some(page) = self.page {
            params = params.page(page);
        }
        if let Some(search) = &self.search {
            params = params.search(search.clone());
        }
        if let Some(ordering) = &self.ordering {
            params = params.ordering(ordering.clone());
        }
        for (key, value) in &self.filters {
            params = params.filter(key.clone(), value.clone());
        }
        params
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[derive(Args, Clone)]
pub struct AssetFields {
    #[arg(long)]
    code: String,
    #[arg(long)]
    serial: String,
    #[arg(long)]
    brand: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    type_id: EquipmentTypeId,
    #[arg(long)]
    status_id: AssetStatusId,
    #[arg(long)]
    location_id: LocationId,
}

impl From<AssetFields> for AssetInput {
    fn from(f: AssetFields) -> Self {
        AssetInput {
            inventory_code: f.code,
            serial_number: f.serial,
            brand: f.brand,
            model: f.model,
            equipment_type_id: f.type_id,
            status_id: f.status_id,
            location_id: f.location_id,
        }
    }
}

#[derive(Args, Clone)]
pub struct AssetPatchFields {
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    serial: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    type_id: Option<EquipmentTypeId>,
    #[arg(long)]
    status_id: Option<AssetStatusId>,
    #[arg(long)]
    location_id: Option<LocationId>,
}

impl From<AssetPatchFields> for AssetPatch {
    fn from(f: AssetPatchFields) -> Self {
        AssetPatch {
            inventory_code: f.code,
            serial_number: f.serial,
            brand: f.brand,
            model: f.model,
            equipment_type_id: f.type_id,
            status_id: f.status_id,
            location_id: f.location_id,
        }
    }
}

#[derive(Subcommand)]
pub enum AssetsCommand {
    /// List one page of assets
    List(ListArgs),
    /// Show one asset
    Show { id: AssetId },
    /// Register a new asset
    Create(AssetFields),
    /// Replace every field of an asset
    Update {
        id: AssetId,
        #[command(flatten)]
        fields: AssetFields,
    },
    /// Change some fields of an asset
    Patch {
        id: AssetId,
        #[command(flatten)]
        fields: AssetPatchFields,
    },
    /// Delete an asset
    Delete { id: AssetId },
    /// Move an asset to another location
    Move {
        id: AssetId,
        /// Destination location id
        #[arg(long)]
        to: LocationId,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Print QR label data (current page when no ids are given)
    PrintLabels { ids: Vec<AssetId> },
}

#[derive(Subcommand)]
pub enum LocationsCommand {
    List(ListArgs),
    Show { id: LocationId },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        department_id: DepartmentId,
    },
    Delete { id: LocationId },
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    List(ListArgs),
    Show { id: MovementId },
}

#[derive(Subcommand)]
pub enum AuditCommand {
    List(ListArgs),
    Show { id: AuditLogId },
}

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login {
            username,
            password,
            redirect,
        } => login(app, &username, password, redirect).await,
        Command::Logout => {
            app.session.logout().await;
            app.assets.clear_state();
            println!("Signed out");
            Ok(())
        }
        Command::Whoami { verify } => whoami(app, verify).await,
        Command::Refresh => {
            if app.session.refresh_access_token().await? {
                println!("Access token refreshed");
                Ok(())
            } else {
                bail!("no refresh token stored; sign in first")
            }
        }
        Command::Navigate { path } => {
            let outcome = app.navigate(&path)?;
            for notice in &outcome.notices {
                eprintln!("{notice}");
            }
            for hop in &outcome.redirects {
                println!("{} -> {} ({:?})", hop.from, hop.to, hop.reason);
            }
            println!("{}  [{}]", outcome.location.path, outcome.title);
            Ok(())
        }
        Command::Assets(cmd) => assets(app, cmd).await,
        Command::Locations(cmd) => locations(app, cmd).await,
        Command::History(cmd) => history(app, cmd).await,
        Command::Audit(cmd) => audit(app, cmd).await,
    }
}

/// Navigate to `path`; a guard redirect ends the command with its notice.
fn enter(app: &mut App, path: &str) -> Result<Location> {
    let outcome = app.navigate(path)?;
    for notice in &outcome.notices {
        eprintln!("{notice}");
    }
    if outcome.was_redirected() {
        if outcome.is_at("login") {
            bail!("sign in first (sca login <username>)");
        }
        bail!("redirected to {} ({})", outcome.location.path, outcome.title);
    }
    tracing::debug!(title = %outcome.title, "entered {}", outcome.location.path);
    Ok(outcome.location)
}

async fn login(app: &mut App, username: &str, password: Option<String>, redirect: Option<String>) -> Result<()> {
    let outcome = app.navigate("/login")?;
    if !outcome.is_at("login") {
        let session = app.current_session();
        println!(
            "Already signed in as {}",
            session.username().unwrap_or_default()
        );
        return Ok(());
    }

    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };

    let user = match app.session.login(username, &password).await {
        Ok(user) => user,
        Err(err) => bail!("{}", err.message()),
    };

    let session = app.current_session();
    let target = app.router.post_login_target(&session, redirect.as_deref());
    let landing = app.navigate(&target)?;
    println!(
        "Signed in as {} ({})",
        user.display_name(),
        user.role_name().unwrap_or_default()
    );
    println!("{}  [{}]", landing.location.path, landing.title);
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn whoami(app: &mut App, verify: bool) -> Result<()> {
    let session = app.current_session();
    let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated()) else {
        println!("Not signed in");
        return Ok(());
    };

    println!("{} <{}>", user.display_name(), user.username);
    match session.role() {
        Some(role) => println!("role: {role}"),
        None => println!("role: {} (not recognized)", user.role_name().unwrap_or("none")),
    }
    for line in permission_report(&session) {
        println!("{line}");
    }

    if verify {
        let valid = app.session.verify_access_token().await?;
        println!("access token: {}", if valid { "valid" } else { "rejected" });
    }
    Ok(())
}

/// One line per permission: granted or not, and why.
fn permission_report(session: &Session) -> Vec<String> {
    Permission::ALL
        .into_iter()
        .map(|permission| {
            let explanation = explain_authorization(session, permission);
            let mark = if explanation.granted { "yes" } else { "no " };
            let mut line = format!("  [{mark}] {:<14} {}", permission.name(), explanation.reason);
            if !explanation.granted && !explanation.granting_roles.is_empty() {
                let roles: Vec<&str> = explanation.granting_roles.iter().map(|r| r.wire_name()).collect();
                line.push_str(&format!(" (held by {})", roles.join(", ")));
            }
            line
        })
        .collect()
}

/// Location writes are for staff accounts; reads only need a session.
fn require_location_admin(session: &Session) -> Result<()> {
    if !session.can_manage_locations() {
        bail!("{}", sca_navigation::guard::DENIAL_NOTICE);
    }
    Ok(())
}

async fn assets(app: &mut App, cmd: AssetsCommand) -> Result<()> {
    match cmd {
        AssetsCommand::List(args) => {
            enter(app, "/activos")?;
            let params = args.params();
            let items = app.assets.fetch_assets(&params).await?;
            for asset in items {
                println!(
                    "{:>6}  {:<14} {:<12} {} {}  @ {}",
                    asset.id,
                    asset.inventory_code,
                    asset.serial_number,
                    asset.brand,
                    asset.model,
                    asset
                        .location
                        .as_ref()
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "-".into())
                );
            }
            let store = &app.assets;
            println!(
                "page {} - {} assets{}{}",
                store.cursor().current_page,
                store.total_count(),
                if store.has_previous_page() { " - has previous" } else { "" },
                if store.has_next_page() { " - has next" } else { "" },
            );
        }
        AssetsCommand::Show { id } => {
            enter(app, &format!("/activos/{id}"))?;
            let asset = app.assets.fetch_asset(id).await?;
            print_json(&asset)?;
        }
        AssetsCommand::Create(fields) => {
            enter(app, "/activos/nuevo")?;
            let created = app.assets.add_asset(&fields.into()).await?;
            println!("Created asset {} ({})", created.id, created.inventory_code);
        }
        AssetsCommand::Update { id, fields } => {
            enter(app, &format!("/activos/{id}/editar"))?;
            let updated = app.assets.edit_asset(id, &fields.into()).await?;
            print_json(&updated)?;
        }
        AssetsCommand::Patch { id, fields } => {
            enter(app, &format!("/activos/{id}/editar"))?;
            let patch: AssetPatch = fields.into();
            if patch.is_empty() {
                bail!("nothing to change; pass at least one field");
            }
            let updated = app.assets.patch_asset(id, &patch).await?;
            print_json(&updated)?;
        }
        AssetsCommand::Delete { id } => {
            enter(app, &format!("/activos/{id}/eliminar"))?;
            app.assets.remove_asset(id).await?;
            println!("Deleted asset {id}");
        }
        AssetsCommand::Move { id, to, notes } => {
            enter(app, &format!("/activos/{id}/movilizar"))?;
            let outcome = app.assets.move_asset(id, &MoveRequest::new(to, notes)).await?;
            if let Some(message) = outcome.as_ref().and_then(|o| o.message.as_ref()) {
                println!("{message}");
            }
            if let Some(asset) = app.assets.current() {
                let location = asset.location.as_ref().map(|l| l.to_string());
                println!(
                    "Asset {} is now at {}",
                    asset.inventory_code,
                    location.as_deref().unwrap_or("-")
                );
            }
        }
        AssetsCommand::PrintLabels { ids } => {
            enter(app, "/imprimir-etiquetas")?;
            let assets = if ids.is_empty() {
                app.assets.fetch_assets(&ListParams::new()).await?.to_vec()
            } else {
                let mut found = Vec::with_capacity(ids.len());
                for id in ids {
                    found.push(app.assets.fetch_asset(id).await?);
                }
                found
            };
            let labels: Vec<_> = assets.iter().map(|a| a.label()).collect();
            print_json(&labels)?;
        }
    }
    Ok(())
}

async fn locations(app: &mut App, cmd: LocationsCommand) -> Result<()> {
    enter(app, "/ubicaciones")?;
    match cmd {
        LocationsCommand::List(args) => {
            let page = app.locations.list(&args.params()).await?;
            for location in &page.results {
                println!("{:>6}  {}", location.id, location);
            }
            println!("{} locations", page.count);
        }
        LocationsCommand::Show { id } => {
            print_json(&app.locations.get(id).await?)?;
        }
        LocationsCommand::Create {
            name,
            department_id,
        } => {
            require_location_admin(&app.current_session())?;
            let created = app
                .locations
                .create(&LocationInput {
                    name,
                    department_id,
                })
                .await?;
            println!("Created location {} ({})", created.id, created);
        }
        LocationsCommand::Delete { id } => {
            require_location_admin(&app.current_session())?;
            app.locations.delete(id).await?;
            println!("Deleted location {id}");
        }
    }
    Ok(())
}

async fn history(app: &mut App, cmd: HistoryCommand) -> Result<()> {
    enter(app, "/historial")?;
    match cmd {
        HistoryCommand::List(args) => {
            let page = app.audit.list_movements(&args.params()).await?;
            for record in &page.results {
                let place = |l: Option<&sca_inventory::LocationSummary>| {
                    l.map(|l| l.name.clone()).unwrap_or_else(|| "-".into())
                };
                println!(
                    "{:>6}  {}  {:?}  {}  {} -> {}",
                    record.id,
                    record.moved_at.format("%Y-%m-%d %H:%M"),
                    record.kind,
                    record.asset.inventory_code,
                    place(record.origin.as_ref()),
                    place(record.destination.as_ref()),
                );
            }
            println!("{} movements", page.count);
        }
        HistoryCommand::Show { id } => {
            print_json(&app.audit.get_movement(id).await?)?;
        }
    }
    Ok(())
}

async fn audit(app: &mut App, cmd: AuditCommand) -> Result<()> {
    enter(app, "/auditoria")?;
    match cmd {
        AuditCommand::List(args) => {
            let page = app.audit.list_audit_logs(&args.params()).await?;
            for entry in &page.results {
                println!(
                    "{:>6}  {}  {:<8} {}",
                    entry.id,
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.action,
                    entry.username.as_deref().unwrap_or("-"),
                );
            }
            println!("{} entries", page.count);
        }
        AuditCommand::Show { id } => {
            print_json(&app.audit.get_audit_log(id).await?)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{text}");
    Ok(())
}

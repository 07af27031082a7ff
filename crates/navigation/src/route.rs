//! Declarative route metadata and the validated route table.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use sca_auth::{Permission, Role};

use crate::routes::{LANDING_ROUTES, LOGIN};

/// Route declaration, as written in the route list.
///
/// Permission names are plain strings here so the declaration reads like the
/// metadata the views use; [`RouteTable::new`] rejects unknown names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub path: &'static str,
    pub title: Option<&'static str>,
    pub requires_auth: bool,
    pub required_roles: Vec<Role>,
    pub required_permission: Option<&'static str>,
}

impl RouteDef {
    pub fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            title: None,
            requires_auth: false,
            required_roles: Vec::new(),
            required_permission: None,
        }
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.required_roles.push(role);
        self
    }

    pub fn roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.required_roles.extend(roles);
        self
    }

    pub fn permission(mut self, name: &'static str) -> Self {
        self.required_permission = Some(name);
        self
    }
}

/// Validated access requirements of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAccess {
    pub requires_auth: bool,
    /// `None` means any role; otherwise the session role must be a member.
    pub roles: Option<Vec<Role>>,
    pub permission: Option<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    fn parse(route: &'static str, path: &str) -> Result<Self, RouteTableError> {
        let malformed = |reason: &str| RouteTableError::MalformedPath {
            route,
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(malformed("path must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut params = HashSet::new();
        for raw in split_segments(path) {
            if raw.is_empty() {
                return Err(malformed("empty path segment"));
            }
            if let Some(name) = raw.strip_prefix(':') {
                if name.is_empty() {
                    return Err(malformed("parameter without a name"));
                }
                if !params.insert(name.to_string()) {
                    return Err(malformed("duplicate parameter name"));
                }
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Static(raw.to_string()));
            }
        }

        Ok(Self { segments })
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts = split_segments(path);
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(s) if s == part => {}
                Segment::Static(_) => return None,
                Segment::Param(_) if part.is_empty() => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(params)
    }

    /// Static segments outrank parameters when several patterns match.
    fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// Shape used to detect two patterns that would always match the same paths.
    fn shape(&self) -> Vec<Option<&str>> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Static(v) => Some(v.as_str()),
                Segment::Param(_) => None,
            })
            .collect()
    }
}

/// Segments of a path without query string and without the trailing slash.
fn split_segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_start_matches('/');
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// A validated route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub title: Option<&'static str>,
    pub access: RouteAccess,
    pattern: PathPattern,
}

impl Route {
    /// Concrete path for this route with `:param` segments substituted.
    pub fn href(&self, params: &BTreeMap<String, String>) -> Option<String> {
        if self.pattern.segments.is_empty() {
            return Some("/".to_string());
        }
        let mut out = String::new();
        for segment in &self.pattern.segments {
            out.push('/');
            match segment {
                Segment::Static(s) => out.push_str(s),
                Segment::Param(name) => out.push_str(params.get(name)?),
            }
        }
        Some(out)
    }
}

/// Route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub route: &'a Route,
    /// Full requested path, query string included.
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route '{route}' has malformed path '{path}': {reason}")]
    MalformedPath {
        route: &'static str,
        path: String,
        reason: String,
    },

    #[error("duplicate route name '{0}'")]
    DuplicateName(&'static str),

    #[error("routes '{0}' and '{1}' declare the same path")]
    DuplicatePath(&'static str, &'static str),

    #[error("route '{route}' references unknown permission '{permission}'")]
    UnknownPermission {
        route: &'static str,
        permission: &'static str,
    },

    #[error("required route '{0}' is missing")]
    MissingRoute(&'static str),
}

/// All navigable routes, validated at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Validate declarations and build the table.
    ///
    /// Fails fast on unknown permission names, duplicate names or paths,
    /// malformed paths, and a missing login or landing route.
    pub fn new(defs: impl IntoIterator<Item = RouteDef>) -> Result<Self, RouteTableError> {
        let mut routes: Vec<Route> = Vec::new();

        for def in defs {
            if routes.iter().any(|r| r.name == def.name) {
                return Err(RouteTableError::DuplicateName(def.name));
            }

            let pattern = PathPattern::parse(def.name, def.path)?;
            if let Some(existing) = routes.iter().find(|r| r.pattern.shape() == pattern.shape()) {
                return Err(RouteTableError::DuplicatePath(existing.name, def.name));
            }

            let permission = def
                .required_permission
                .map(|name| {
                    name.parse::<Permission>()
                        .map_err(|_| RouteTableError::UnknownPermission {
                            route: def.name,
                            permission: name,
                        })
                })
                .transpose()?;

            let mut roles = def.required_roles.clone();
            roles.sort();
            roles.dedup();

            routes.push(Route {
                name: def.name,
                path: def.path,
                title: def.title,
                access: RouteAccess {
                    requires_auth: def.requires_auth,
                    roles: (!roles.is_empty()).then_some(roles),
                    permission,
                },
                pattern,
            });
        }

        for required in std::iter::once(LOGIN).chain(LANDING_ROUTES) {
            if !routes.iter().any(|r| r.name == required) {
                return Err(RouteTableError::MissingRoute(required));
            }
        }

        Ok(Self { routes })
    }

    /// The built-in hospital route table.
    pub fn hospital() -> Result<Self, RouteTableError> {
        Self::new(crate::routes::hospital_routes())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Match a concrete path (query string allowed) to the most specific route.
    pub fn resolve(&self, full_path: &str) -> Option<ResolvedRoute<'_>> {
        let (path, query) = match full_path.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (full_path, BTreeMap::new()),
        };

        self.routes
            .iter()
            .filter_map(|route| route.pattern.matches(path).map(|params| (route, params)))
            .max_by_key(|(route, _)| route.pattern.specificity())
            .map(|(route, params)| ResolvedRoute {
                route,
                full_path: full_path.to_string(),
                params,
                query,
            })
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

/// Form-encode a single query value.
pub(crate) fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::hospital().unwrap()
    }

    #[test]
    fn hospital_table_is_valid() {
        let table = table();
        assert!(table.get("login").is_some());
        assert_eq!(
            table.get("asset-edit").unwrap().access.permission,
            Some(Permission::ManageAssets)
        );
    }

    #[test]
    fn static_segment_beats_parameter() {
        let table = table();
        assert_eq!(table.resolve("/activos/nuevo").unwrap().route.name, "asset-create");
        let detail = table.resolve("/activos/17").unwrap();
        assert_eq!(detail.route.name, "asset-detail");
        assert_eq!(detail.params.get("id").map(String::as_str), Some("17"));
    }

    #[test]
    fn resolves_root_trailing_slash_and_query() {
        let table = table();
        assert_eq!(table.resolve("/").unwrap().route.name, "home");
        assert_eq!(table.resolve("/activos/").unwrap().route.name, "asset-list");
        let login = table.resolve("/login?redirect=%2Factivos%2F5").unwrap();
        assert_eq!(login.route.name, "login");
        assert_eq!(login.query.get("redirect").map(String::as_str), Some("/activos/5"));
        assert!(table.resolve("/no-such-page").is_none());
    }

    #[test]
    fn unknown_permission_fails_fast() {
        let mut defs = crate::routes::hospital_routes();
        defs.push(
            RouteDef::new("legacy-edit", "/legacy/:id/editar")
                .requires_auth()
                .permission("canEditAssets"),
        );
        assert_eq!(
            RouteTable::new(defs).unwrap_err(),
            RouteTableError::UnknownPermission {
                route: "legacy-edit",
                permission: "canEditAssets"
            }
        );
    }

    #[test]
    fn duplicate_and_malformed_declarations_are_rejected() {
        let mut defs = crate::routes::hospital_routes();
        defs.push(RouteDef::new("asset-detail-2", "/activos/:asset"));
        assert!(matches!(
            RouteTable::new(defs),
            Err(RouteTableError::DuplicatePath("asset-detail", "asset-detail-2"))
        ));

        let mut defs = crate::routes::hospital_routes();
        defs.push(RouteDef::new("bad", "activos"));
        assert!(matches!(
            RouteTable::new(defs),
            Err(RouteTableError::MalformedPath { route: "bad", .. })
        ));

        let defs = vec![RouteDef::new("login", "/login")];
        assert!(matches!(RouteTable::new(defs), Err(RouteTableError::MissingRoute(_))));
    }

    #[test]
    fn href_substitutes_params() {
        let table = table();
        let route = table.get("asset-move").unwrap();
        let params = BTreeMap::from([("id".to_string(), "9".to_string())]);
        assert_eq!(route.href(&params).as_deref(), Some("/activos/9/movilizar"));
        assert_eq!(table.get("home").unwrap().href(&BTreeMap::new()).as_deref(), Some("/"));
    }

    #[test]
    fn encoded_return_path_survives_resolution() {
        let table = table();
        let back = "/activos/5?page=2&search=monitor hp";
        let login = table
            .resolve(&format!("/login?redirect={}", encode_component(back)))
            .unwrap();
        assert_eq!(login.query.get("redirect").map(String::as_str), Some(back));
    }

    #[test]
    fn query_plus_decodes_to_space() {
        let table = table();
        let resolved = table.resolve("/activos?search=monitor+hp&page=2").unwrap();
        assert_eq!(resolved.query.get("search").map(String::as_str), Some("monitor hp"));
        assert_eq!(resolved.query.get("page").map(String::as_str), Some("2"));
    }
}

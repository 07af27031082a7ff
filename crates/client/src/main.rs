//! Command-line client for the SCA hospital asset inventory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sca_client::{App, ClientConfig, ConfigOverrides};
use sca_observability::{LogFormat, LogOptions};

mod commands;

use commands::Command;

#[derive(Parser)]
#[command(name = "sca")]
#[command(about = "SCA Hospital - asset inventory client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API origin, e.g. https://sca.hospital.example (default: $SCA_API_URL or http://localhost:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the persisted session (default: $SCA_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Request timeout in seconds (default: $SCA_HTTP_TIMEOUT_SECS or 15)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    sca_observability::init(LogOptions {
        format: if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
        verbose: cli.verbose,
    });

    let config = ClientConfig::load(ConfigOverrides {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
        timeout_secs: cli.timeout,
    })
    .context("invalid configuration")?;

    let mut app = App::bootstrap(config)
        .await
        .context("failed to start the client")?;

    commands::run(&mut app, cli.command).await
}

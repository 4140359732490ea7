#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the SDOH map dashboard.
//!
//! Serves the JSON API and the static dashboard page.

use std::path::PathBuf;

use clap::Parser;
use sdoh_map_config::{DashboardConfig, resolve_path};

#[derive(Parser)]
#[command(name = "sdoh_map_server", about = "SDOH map dashboard server")]
struct Cli {
    /// Path to `dashboard.toml` (default: `$DASHBOARD_CONFIG` or
    /// `./dashboard.toml`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prompt for the bind address and port before starting
    #[arg(long)]
    interactive: bool,
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let config = DashboardConfig::load(&resolve_path(cli.config.as_deref()))?;

    if cli.interactive {
        sdoh_map_server::interactive::run(config).await?;
    } else {
        sdoh_map_server::run_server(config).await?;
    }

    Ok(())
}

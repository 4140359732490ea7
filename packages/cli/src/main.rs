#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the SDOH map dashboard.
//!
//! Serves the dashboard, checks the data, and prints legends and menus.
//! With no subcommand it asks what to do.
//!
//! Uses `indicatif-log-bridge` (via [`sdoh_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sdoh_map_config::{DashboardConfig, resolve_path};

#[derive(Parser)]
#[command(name = "sdoh_map_cli", about = "SDOH map dashboard tools")]
struct Cli {
    /// Path to `dashboard.toml` (default: `$DASHBOARD_CONFIG` or
    /// `./dashboard.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve,
    /// Check the indicator table against the regions and menus
    Validate,
    /// Print the fill legend of an indicator
    Legend {
        /// SDOH indicator key (default: first menu entry)
        #[arg(long)]
        indicator: Option<String>,
    },
    /// List both menus
    Menus,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multi = sdoh_map_cli_utils::init_logger();

    let cli = Cli::parse();
    let config_path = resolve_path(cli.config.as_deref());
    log::debug!("Using configuration path {}", config_path.display());
    let config = DashboardConfig::load(&config_path)?;

    match cli.command {
        Some(Commands::Serve) => commands::serve(config).await?,
        Some(Commands::Validate) => {
            if !commands::validate(&multi, config).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Legend { indicator }) => {
            commands::legend(&multi, &config, indicator.as_deref())?;
        }
        Some(Commands::Menus) => commands::menus(),
        None => interactive::run(&multi, config).await?,
    }

    Ok(ExitCode::SUCCESS)
}

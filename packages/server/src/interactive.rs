//! Interactive mode for the server.
//!
//! Prompts the user for bind address and port before starting the server.

use dialoguer::{Confirm, Input};
use sdoh_map_config::DashboardConfig;

use crate::ServerError;

/// Runs the server in interactive mode, prompting for the listener.
///
/// Asks for a bind address and port, defaulting to the configured ones,
/// and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns [`ServerError`] if the underlying server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: DashboardConfig) -> Result<(), ServerError> {
    println!("SDOH Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(config.server.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.server.bind_addr.clone());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(config.server.port.to_string())
        .interact_text()
        .unwrap_or_else(|_| config.server.port.to_string());

    config.apply_overrides(Some(bind_addr), Some(port_str));

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{}?",
            config.server.bind_addr, config.server.port
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}

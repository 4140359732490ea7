//! Menu-driven mode used when no subcommand is given.

use dialoguer::Select;
use sdoh_map_cli_utils::MultiProgress;
use sdoh_map_config::DashboardConfig;
use sdoh_map_indicators::registry::sdoh_menu;

use crate::commands;

/// Top-level action selection.
enum Action {
    Serve,
    Validate,
    Legend,
    Menus,
}

impl Action {
    const ALL: &[Self] = &[Self::Serve, Self::Validate, Self::Legend, Self::Menus];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Serve => "Start server",
            Self::Validate => "Validate data",
            Self::Legend => "Show indicator legend",
            Self::Menus => "List menus",
        }
    }
}

/// Prompts for an action and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("SDOH Map");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Serve => commands::serve_interactive(config).await?,
        Action::Validate => {
            if !commands::validate(multi, config).await? {
                println!("Data has integrity problems.");
            }
        }
        Action::Legend => {
            let menu = sdoh_menu();
            let entry_labels: Vec<&str> = menu.entries.iter().map(|e| e.label.as_str()).collect();
            let idx = Select::new()
                .with_prompt(menu.title.as_str())
                .items(&entry_labels)
                .default(0)
                .interact()?;
            commands::legend(multi, &config, Some(&menu.entries[idx].key))?;
        }
        Action::Menus => commands::menus(),
    }

    Ok(())
}

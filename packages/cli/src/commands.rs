//! Subcommand implementations shared by the flag-driven and interactive
//! entry points.

use std::fmt::Write as _;

use sdoh_map_cli_utils::{MultiProgress, Spinner};
use sdoh_map_config::DashboardConfig;
use sdoh_map_indicators::breakpoints::column_legend;
use sdoh_map_indicators::registry::Menus;
use sdoh_map_indicators::table::IndicatorTable;
use sdoh_map_indicators_models::MenuEntry;
use sdoh_map_indicators_models::encoding::LegendTick;
use sdoh_map_server::AppState;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Loads the table and boundaries behind a spinner.
#[allow(clippy::future_not_send)]
async fn load_state(multi: &MultiProgress, config: DashboardConfig) -> CmdResult<AppState> {
    let spinner = Spinner::start(multi, "Loading indicator table and boundaries...");
    let state = match AppState::load(config).await {
        Ok(state) => state,
        Err(e) => {
            spinner.finish("Loading failed");
            return Err(e.into());
        }
    };
    spinner.finish(&format!(
        "Loaded {} rows, {} regions{}",
        state.table.len(),
        state.regions.len(),
        if state.boundaries.is_some() {
            ""
        } else {
            " (no boundaries)"
        }
    ));
    Ok(state)
}

/// Prints the integrity report. Returns whether the data is clean.
///
/// # Errors
///
/// Returns an error if the indicator table cannot be loaded.
#[allow(clippy::future_not_send)]
pub async fn validate(multi: &MultiProgress, config: DashboardConfig) -> CmdResult<bool> {
    let state = load_state(multi, config).await?;
    let report = state.validate();
    print!("{report}");
    Ok(report.is_clean())
}

/// Prints the fill legend of one indicator.
///
/// # Errors
///
/// Returns an error if the table cannot be loaded, the key is not in the
/// SDOH menu, or the column has no values.
pub fn legend(
    multi: &MultiProgress,
    config: &DashboardConfig,
    indicator: Option<&str>,
) -> CmdResult<()> {
    let menus = Menus::embedded();
    let entry = menus.sdoh.resolve(indicator)?;

    let spinner = Spinner::start(multi, "Loading indicator table...");
    let table = IndicatorTable::from_path(&config.data.indicator_csv, &config.data)?;
    spinner.clear();

    let ticks = column_legend(&table, entry, &config.legend)?;
    print!("{}", format_legend(entry, &ticks));
    Ok(())
}

/// Prints both menus.
pub fn menus() {
    print!("{}", format_menus(&Menus::embedded()));
}

/// Runs the server on its own actix system.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve(config: DashboardConfig) -> CmdResult<()> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(sdoh_map_server::run_server(config))
    })
    .await??;
    Ok(())
}

/// Interactive variant of [`serve`].
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve_interactive(config: DashboardConfig) -> CmdResult<()> {
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(sdoh_map_server::interactive::run(config))
    })
    .await??;
    Ok(())
}

fn format_legend(entry: &MenuEntry, ticks: &[LegendTick]) -> String {
    let mut out = format!("{} ({})\n", entry.label, entry.key);
    for tick in ticks {
        let _ = writeln!(out, "  {:>12.0}  {}", tick.position, tick.label);
    }
    out
}

fn format_menus(menus: &Menus) -> String {
    let mut out = String::new();
    for menu in [&menus.sdoh, &menus.lab] {
        let _ = writeln!(out, "{} [{}]", menu.title, menu.kind);
        for (i, entry) in menu.entries.iter().enumerate() {
            let marker = if i == 0 { "*" } else { " " };
            let _ = writeln!(out, " {marker} {:<26} {}", entry.key, entry.label);
            if let Some(description) = &entry.description {
                let _ = writeln!(out, "     {description}");
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_lists_positions_and_labels() {
        let menus = Menus::embedded();
        let entry = menus.sdoh.default_entry().unwrap();
        let text = format_legend(
            entry,
            &[
                LegendTick {
                    position: 3_000_000.0,
                    value: 18.0,
                    label: "18".to_string(),
                },
                LegendTick {
                    position: 4_000_000.0,
                    value: 24.0,
                    label: "24".to_string(),
                },
            ],
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("(ACS_PCT_HH_PUB_ASSIST)"));
        assert_eq!(lines[1].trim(), "3000000  18");
    }

    #[test]
    fn menus_mark_defaults() {
        let text = format_menus(&Menus::embedded());
        assert!(text.contains("[sdoh]"));
        assert!(text.contains("[lab]"));
        assert!(text.contains(" * ACS_PCT_HH_PUB_ASSIST"));
        assert!(text.contains(" * albumin_urine"));
        assert!(text.contains("   bun"));
    }
}

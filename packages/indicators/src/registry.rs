//! Compile-time registry of the two indicator menus.
//!
//! Each menu is a TOML file in `menus/` embedded via `include_str!`.
//! Adding an option means adding an `[[entries]]` block to the right file.

use sdoh_map_indicators_models::{Menu, MenuKind};

/// Embedded SDOH indicator menu.
const SDOH_MENU_TOML: &str = include_str!("../menus/sdoh.toml");

/// Embedded kidney lab metric menu.
const LAB_MENU_TOML: &str = include_str!("../menus/labs.toml");

/// Both menus of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Menus {
    /// Drives the municipality fill.
    pub sdoh: Menu,
    /// Drives the marker colors.
    pub lab: Menu,
}

impl Menus {
    /// Loads both embedded menus.
    ///
    /// # Panics
    ///
    /// Panics if either embedded TOML file fails to parse. See
    /// [`sdoh_menu`].
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            sdoh: sdoh_menu(),
            lab: lab_menu(),
        }
    }

    /// Returns the menu of the given kind.
    #[must_use]
    pub const fn get(&self, kind: MenuKind) -> &Menu {
        match kind {
            MenuKind::Sdoh => &self.sdoh,
            MenuKind::Lab => &self.lab,
        }
    }
}

fn parse_menu(name: &str, toml_str: &str) -> Menu {
    toml::de::from_str(toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse embedded menu '{name}': {e}"))
}

/// Returns the SDOH indicator menu.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a parse failure is a development error caught by the tests
/// below.
#[must_use]
pub fn sdoh_menu() -> Menu {
    parse_menu("sdoh", SDOH_MENU_TOML)
}

/// Returns the kidney lab metric menu.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn lab_menu() -> Menu {
    parse_menu("labs", LAB_MENU_TOML)
}

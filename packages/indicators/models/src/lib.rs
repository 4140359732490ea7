#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Indicator menu and map encoding types.
//!
//! The dashboard offers two fixed menus: social-determinants-of-health
//! (SDOH) indicators that shade the municipalities, and kidney-disease lab
//! metrics that color the municipality markers. A [`Selection`] picks one
//! entry from each; the encoder turns that into a [`encoding::MapView`].

pub mod encoding;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which of the two menus an entry belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MenuKind {
    /// Social determinants of health; drives the choropleth fill.
    Sdoh,
    /// Kidney-disease lab metrics; drives the marker colors.
    Lab,
}

/// One selectable option in a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    /// Column identifier in the indicator table (e.g. `ACS_PCT_UNINSURED`).
    pub key: String,
    /// Short label for menus, hover text, and colorbar titles.
    pub label: String,
    /// Longer explanation shown under the menu.
    #[serde(default)]
    pub description: Option<String>,
    /// Column holding a pre-scaled color value for this entry.
    #[serde(default)]
    pub color_column: Option<String>,
    /// Spacing of linear colorbar ticks.
    #[serde(default)]
    pub dtick: Option<f64>,
    /// Decimal places shown in hover text.
    #[serde(default)]
    pub hover_decimals: usize,
}

/// A fixed, ordered menu. The first entry is the default selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    /// Which menu this is.
    pub kind: MenuKind,
    /// Heading shown above the drop-down.
    pub title: String,
    /// Options in display order.
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MenuEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// The first entry, if the menu has any.
    #[must_use]
    pub fn default_entry(&self) -> Option<&MenuEntry> {
        self.entries.first()
    }

    /// Resolves an optional requested key: absent means the default entry.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMenuKeyError`] if the key is not in the menu, or
    /// if no key was given and the menu is empty.
    pub fn resolve(&self, key: Option<&str>) -> Result<&MenuEntry, UnknownMenuKeyError> {
        let found = match key {
            Some(k) => self.get(k),
            None => self.default_entry(),
        };
        found.ok_or_else(|| UnknownMenuKeyError {
            menu: self.kind,
            key: key.unwrap_or_default().to_string(),
        })
    }

    /// All keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

/// Error returned when a selection names a key that no menu entry has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMenuKeyError {
    /// Menu that was searched.
    pub menu: MenuKind,
    /// The key that was requested.
    pub key: String,
}

impl std::fmt::Display for UnknownMenuKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} menu key '{}'", self.menu, self.key)
    }
}

impl std::error::Error for UnknownMenuKeyError {}

/// The pair of menu choices behind one map render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Selected SDOH indicator key.
    pub indicator: String,
    /// Selected lab metric key.
    pub lab: String,
}

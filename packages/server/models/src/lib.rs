#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the SDOH map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the configuration and table types to allow independent evolution of
//! the API contract.

use sdoh_map_config::{LogoConfig, PageConfig};
use sdoh_map_geography_models::{Centroid, Region, RegionCode};
use sdoh_map_indicators_models::encoding::LegendTick;
use sdoh_map_indicators_models::{Menu, MenuEntry, MenuKind};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Whether the boundary document was loaded.
    pub boundaries_loaded: bool,
    /// Number of known regions.
    pub region_count: usize,
}

/// A linked branding image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogo {
    /// Alt text.
    pub alt: String,
    /// Link target.
    pub href: String,
    /// Image URL.
    pub image: String,
}

impl From<&LogoConfig> for ApiLogo {
    fn from(logo: &LogoConfig) -> Self {
        Self {
            alt: logo.alt.clone(),
            href: logo.href.clone(),
            image: logo.image.clone(),
        }
    }
}

/// Static page text and branding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage {
    /// Main heading.
    pub title: String,
    /// Browser tab title.
    pub short_title: String,
    /// One-line description.
    pub about: String,
    /// Data attribution.
    pub footnote: String,
    /// Branding images.
    pub logos: Vec<ApiLogo>,
}

impl From<&PageConfig> for ApiPage {
    fn from(page: &PageConfig) -> Self {
        Self {
            title: page.title.clone(),
            short_title: page.short_title.clone(),
            about: page.about.clone(),
            footnote: page.footnote.clone(),
            logos: page.logos.iter().map(ApiLogo::from).collect(),
        }
    }
}

/// One menu as offered to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMenu {
    /// Which menu this is.
    pub kind: MenuKind,
    /// Heading above the drop-down.
    pub title: String,
    /// Key selected when the page first loads.
    pub default_key: Option<String>,
    /// Options in display order.
    pub entries: Vec<MenuEntry>,
}

impl From<&Menu> for ApiMenu {
    fn from(menu: &Menu) -> Self {
        Self {
            kind: menu.kind,
            title: menu.title.clone(),
            default_key: menu.default_entry().map(|e| e.key.clone()),
            entries: menu.entries.clone(),
        }
    }
}

/// Both menus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMenus {
    /// Indicator menu driving the fill.
    pub sdoh: ApiMenu,
    /// Lab metric menu driving the markers.
    pub lab: ApiMenu,
}

/// Query parameters for the map endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// SDOH indicator key. Defaults to the first menu entry.
    pub indicator: Option<String>,
    /// Lab metric key. Defaults to the first menu entry.
    pub lab: Option<String>,
}

/// Query parameters for the legend endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendQueryParams {
    /// SDOH indicator key. Defaults to the first menu entry.
    pub indicator: Option<String>,
}

/// Query parameters for point lookup.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointQueryParams {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

/// Fill legend of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegend {
    /// Indicator key.
    pub indicator: String,
    /// Indicator label, used as the colorbar title.
    pub label: String,
    /// Ticks in position order.
    pub ticks: Vec<LegendTick>,
}

/// A region as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegion {
    /// Five-digit county code.
    pub code: RegionCode,
    /// Municipality name.
    pub name: String,
    /// Marker position, when known.
    pub centroid: Option<Centroid>,
}

impl From<&Region> for ApiRegion {
    fn from(region: &Region) -> Self {
        Self {
            code: region.code.clone(),
            name: region.name.clone(),
            centroid: region.centroid,
        }
    }
}

/// One labelled indicator value of a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionValue {
    /// Menu the entry comes from.
    pub menu: MenuKind,
    /// Column key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Value, absent when the cell was empty or the column is missing.
    pub value: Option<f64>,
}

/// A region with every menu value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegionDetail {
    /// Region identity.
    #[serde(flatten)]
    pub region: ApiRegion,
    /// Values in menu order, SDOH first.
    pub values: Vec<ApiRegionValue>,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Wraps a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

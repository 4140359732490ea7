//! Derived display encoding for one selection.
//!
//! Everything the browser needs to draw the figure: the municipality fill
//! layer, the marker overlay, both colorbars, and the map framing. It is
//! recomputed for every request and never stored.

use sdoh_map_geography_models::{Centroid, RegionCode};
use serde::{Deserialize, Serialize};

use crate::Selection;

/// A percentile cut of an indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    /// Quantile in `[0, 1]`.
    pub quantile: f64,
    /// Column value at that quantile.
    pub value: f64,
}

/// A labelled tick on a colorbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendTick {
    /// Tick position on the color scale.
    pub position: f64,
    /// Breakpoint value rounded to the nearest integer.
    pub value: f64,
    /// Text shown at the tick.
    pub label: String,
}

/// How colorbar ticks are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum TickMode {
    /// Explicit tick positions and labels.
    Array {
        /// Ticks in ascending position order.
        ticks: Vec<LegendTick>,
    },
    /// Evenly spaced ticks starting at `tick0`.
    Linear {
        /// First tick.
        tick0: f64,
        /// Spacing between ticks.
        dtick: f64,
    },
}

/// A horizontal colorbar under the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorBar {
    /// Title shown under the bar.
    pub title: String,
    /// Named color scale.
    pub colorscale: String,
    /// Tick placement.
    pub ticks: TickMode,
}

/// The municipality fill layer.
///
/// `locations`, `z`, and `hover_text` are parallel arrays, one entry per
/// indicator table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethLayer {
    /// Trace name (the indicator label).
    pub name: String,
    /// County codes matching the boundary feature ids.
    pub locations: Vec<RegionCode>,
    /// Fill value per location.
    pub z: Vec<Option<f64>>,
    /// Hover text per location.
    pub hover_text: Vec<String>,
    /// Colorbar for the fill.
    pub color_bar: ColorBar,
}

/// One lab-metric marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointMarker {
    /// County code.
    pub code: RegionCode,
    /// Municipality name.
    pub name: String,
    /// Marker position.
    pub position: Centroid,
    /// Lab metric value.
    pub value: Option<f64>,
    /// Value used for the marker color.
    pub color: Option<f64>,
    /// Hover text.
    pub hover_text: String,
}

/// The lab-metric marker layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOverlay {
    /// Trace name (the lab label).
    pub name: String,
    /// Markers for municipalities with a matching region record.
    pub markers: Vec<PointMarker>,
    /// Lower end of the color range.
    pub cmin: Option<f64>,
    /// Upper end of the color range.
    pub cmax: Option<f64>,
    /// Colorbar for the markers.
    pub color_bar: ColorBar,
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFrame {
    /// View center.
    pub center: Centroid,
    /// Projection zoom.
    pub projection_scale: f64,
    /// Figure height in pixels.
    pub height: u32,
    /// Background color.
    pub background: String,
}

/// The complete figure for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Resolved selection (defaults filled in).
    pub selection: Selection,
    /// Description of the selected indicator.
    pub description: Option<String>,
    /// Municipality fill.
    pub choropleth: ChoroplethLayer,
    /// Lab markers.
    pub overlay: PointOverlay,
    /// Map framing.
    pub frame: MapFrame,
}

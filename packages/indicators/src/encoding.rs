//! Turns a menu selection into the figure the browser draws.
//!
//! Every row of the table shades its municipality. Only rows whose code is
//! a known region and that have a position get a marker; the rest are
//! dropped from the overlay without comment.

use sdoh_map_config::{LegendConfig, MapConfig};
use sdoh_map_geography_models::Centroid;
use sdoh_map_indicators_models::encoding::{
    ChoroplethLayer, ColorBar, MapFrame, MapView, PointMarker, PointOverlay, TickMode,
};
use sdoh_map_indicators_models::{MenuEntry, Selection};

use crate::IndicatorError;
use crate::breakpoints::column_legend;
use crate::catalog::RegionCatalog;
use crate::registry::Menus;
use crate::table::{IndicatorRow, IndicatorTable};

/// Text shown in hover boxes for an absent value.
pub const MISSING_VALUE: &str = "N/A";

/// Everything needed to encode a selection. Cheap to construct per request.
#[derive(Debug, Clone, Copy)]
pub struct MapEncoder<'a> {
    /// Loaded indicator data.
    pub table: &'a IndicatorTable,
    /// Both menus.
    pub menus: &'a Menus,
    /// Regions that markers may be placed on.
    pub regions: &'a RegionCatalog,
    /// Fill legend bucketing.
    pub legend: &'a LegendConfig,
    /// Map framing and color scales.
    pub map: &'a MapConfig,
}

/// Formats a value with a fixed number of decimals, or [`MISSING_VALUE`].
#[must_use]
pub fn format_value(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| MISSING_VALUE.to_string(), |v| format!("{v:.decimals$}"))
}

/// Value from the entry's color column when the table has it, else the
/// entry's own column.
fn color_value(table: &IndicatorTable, row: &IndicatorRow, entry: &MenuEntry) -> Option<f64> {
    match &entry.color_column {
        Some(col) if table.has_column(col) => row.value(col),
        _ => row.value(&entry.key),
    }
}

impl MapEncoder<'_> {
    /// Builds the figure for a selection. Absent keys pick each menu's
    /// first entry.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::UnknownKey`] for a key outside its menu,
    /// [`IndicatorError::MissingColumn`] when the table lacks a selected
    /// column, and [`IndicatorError::EmptyColumn`] when the selected
    /// indicator has no values to build a legend from.
    pub fn encode(
        &self,
        indicator: Option<&str>,
        lab: Option<&str>,
    ) -> Result<MapView, IndicatorError> {
        let sdoh = self.menus.sdoh.resolve(indicator)?;
        let lab = self.menus.lab.resolve(lab)?;

        self.table.require_column(&sdoh.key)?;
        self.table.require_column(&lab.key)?;

        log::debug!("Encoding map for indicator={} lab={}", sdoh.key, lab.key);

        Ok(MapView {
            selection: Selection {
                indicator: sdoh.key.clone(),
                lab: lab.key.clone(),
            },
            description: sdoh.description.clone(),
            choropleth: self.choropleth(sdoh, lab)?,
            overlay: self.overlay(sdoh, lab)?,
            frame: self.frame(),
        })
    }

    fn hover_text(&self, row: &IndicatorRow, sdoh: &MenuEntry, lab: &MenuEntry) -> String {
        format!(
            "{}<br>{}: {}<br>{}: {}",
            row.region.name,
            lab.label,
            format_value(row.value(&lab.key), lab.hover_decimals),
            sdoh.label,
            format_value(row.value(&sdoh.key), sdoh.hover_decimals),
        )
    }

    fn choropleth(
        &self,
        sdoh: &MenuEntry,
        lab: &MenuEntry,
    ) -> Result<ChoroplethLayer, IndicatorError> {
        let ticks = column_legend(self.table, sdoh, self.legend)?;
        let rows = self.table.rows();

        Ok(ChoroplethLayer {
            name: sdoh.label.clone(),
            locations: rows.iter().map(|r| r.code().clone()).collect(),
            z: rows
                .iter()
                .map(|r| color_value(self.table, r, sdoh))
                .collect(),
            hover_text: rows
                .iter()
                .map(|r| self.hover_text(r, sdoh, lab))
                .collect(),
            color_bar: ColorBar {
                title: sdoh.label.clone(),
                colorscale: self.map.region_colorscale.clone(),
                ticks: TickMode::Array { ticks },
            },
        })
    }

    fn marker_position(&self, row: &IndicatorRow) -> Option<Centroid> {
        row.region
            .centroid
            .or_else(|| self.regions.centroid(row.code()))
    }

    fn overlay(&self, sdoh: &MenuEntry, lab: &MenuEntry) -> Result<PointOverlay, IndicatorError> {
        let markers: Vec<PointMarker> = self
            .table
            .rows()
            .iter()
            .filter(|r| self.regions.contains(r.code()))
            .filter_map(|r| {
                let position = self.marker_position(r)?;
                Some(PointMarker {
                    code: r.code().clone(),
                    name: r.region.name.clone(),
                    position,
                    value: r.value(&lab.key),
                    color: color_value(self.table, r, lab),
                    hover_text: self.hover_text(r, sdoh, lab),
                })
            })
            .collect();

        let range = self.table.range(&lab.key)?;

        Ok(PointOverlay {
            name: lab.label.clone(),
            markers,
            cmin: range.map(|(lo, _)| lo),
            cmax: range.map(|(_, hi)| hi),
            color_bar: ColorBar {
                title: lab.label.clone(),
                colorscale: self.map.point_colorscale.clone(),
                ticks: TickMode::Linear {
                    tick0: 0.0,
                    dtick: lab.dtick.unwrap_or(1.0),
                },
            },
        })
    }

    fn frame(&self) -> MapFrame {
        MapFrame {
            center: Centroid {
                lat: self.map.center_lat,
                lon: self.map.center_lon,
            },
            projection_scale: self.map.projection_scale,
            height: self.map.height,
            background: self.map.background.clone(),
        }
    }
}

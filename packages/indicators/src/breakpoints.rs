//! Percentile breakpoints for the fill legend.
//!
//! The fill colors normally come from a pre-scaled color column, so the
//! colorbar ticks sit at fixed color-scale positions and are labelled with
//! the indicator's own percentile values. When the table has no color
//! column the fill uses raw values and each tick sits at its breakpoint.

use sdoh_map_config::LegendConfig;
use sdoh_map_indicators_models::MenuEntry;
use sdoh_map_indicators_models::encoding::{Breakpoint, LegendTick};

use crate::IndicatorError;
use crate::table::IndicatorTable;

/// Linear interpolation between closest ranks, position `(n - 1) * q`.
///
/// `sorted` must be non-empty and ascending.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Evenly spaced quantiles `k / segments` for `k = 0..=segments`, without
/// the median.
///
/// Non-finite values are dropped first. Returns an empty list when no
/// value is left or `segments` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentile_breakpoints(values: &[f64], segments: usize) -> Vec<Breakpoint> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || segments == 0 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    (0..=segments)
        .filter(|k| k * 2 != segments)
        .map(|k| {
            let quantile = k as f64 / segments as f64;
            Breakpoint {
                quantile,
                value: quantile_sorted(&sorted, quantile),
            }
        })
        .collect()
}

/// Where legend ticks sit on the colorbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPlacement {
    /// Fixed positions `tick_start + i * tick_step` on a pre-scaled color
    /// column.
    Scaled,
    /// At each breakpoint's own value, for fills drawn from raw values.
    Raw,
}

impl TickPlacement {
    /// Placement matching the fill values of `entry`.
    #[must_use]
    pub fn for_entry(table: &IndicatorTable, entry: &MenuEntry) -> Self {
        match &entry.color_column {
            Some(col) if table.has_column(col) => Self::Scaled,
            _ => Self::Raw,
        }
    }
}

/// Labels breakpoints as colorbar ticks.
///
/// The first `skip_leading` breakpoints are dropped; the rest are rounded
/// to the nearest integer (ties to even). Scaled ticks are placed at
/// `tick_start`, `tick_start + tick_step`, and so on; raw ticks at the
/// unrounded breakpoint so they stay inside the data range.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn legend_ticks(
    breakpoints: &[Breakpoint],
    legend: &LegendConfig,
    placement: TickPlacement,
) -> Vec<LegendTick> {
    breakpoints
        .iter()
        .skip(legend.skip_leading)
        .enumerate()
        .map(|(i, bp)| {
            // Adding 0.0 turns -0.0 into 0.0 so the label never reads "-0".
            let value = bp.value.round_ties_even() + 0.0;
            let position = match placement {
                TickPlacement::Scaled => (i as f64).mul_add(legend.tick_step, legend.tick_start),
                TickPlacement::Raw => bp.value,
            };
            LegendTick {
                position,
                value,
                label: format!("{value:.0}"),
            }
        })
        .collect()
}

/// Computes the fill legend of one indicator entry.
///
/// # Errors
///
/// Returns [`IndicatorError::MissingColumn`] for an unknown column and
/// [`IndicatorError::EmptyColumn`] when it has no values.
pub fn column_legend(
    table: &IndicatorTable,
    entry: &MenuEntry,
    legend: &LegendConfig,
) -> Result<Vec<LegendTick>, IndicatorError> {
    let values = table.numeric_values(&entry.key)?;
    let breakpoints = percentile_breakpoints(&values, legend.segments);
    if breakpoints.is_empty() {
        return Err(IndicatorError::EmptyColumn {
            column: entry.key.clone(),
        });
    }
    Ok(legend_ticks(
        &breakpoints,
        legend,
        TickPlacement::for_entry(table, entry),
    ))
}

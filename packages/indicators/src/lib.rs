#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Indicator data and its map encoding.
//!
//! Loads the per-municipality indicator table, computes the percentile
//! breakpoints that label the fill legend, turns a menu selection into a
//! [`sdoh_map_indicators_models::encoding::MapView`], and checks the
//! static inputs for integrity problems (unmatched codes, missing columns).

pub mod breakpoints;
pub mod catalog;
pub mod encoding;
pub mod registry;
pub mod table;
pub mod validate;

use sdoh_map_geography_models::InvalidRegionCodeError;
use sdoh_map_indicators_models::UnknownMenuKeyError;
use thiserror::Error;

/// Errors that can occur while loading or encoding indicator data.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// Reading the table failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The table is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is not in the table.
    #[error("Column '{column}' not found in indicator table")]
    MissingColumn {
        /// Column that was looked up.
        column: String,
    },

    /// A column has no usable numeric value.
    #[error("Column '{column}' has no numeric values")]
    EmptyColumn {
        /// Column that was reduced.
        column: String,
    },

    /// A selection named a key outside its menu.
    #[error(transparent)]
    UnknownKey(#[from] UnknownMenuKeyError),

    /// A row's region code is malformed.
    #[error("Line {line}: {source}")]
    InvalidRegionCode {
        /// 1-based line number in the CSV file.
        line: u64,
        /// Parse failure.
        source: InvalidRegionCodeError,
    },
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality region types.
//!
//! A region is a Puerto Rico municipality (a county equivalent) keyed by
//! its five-digit county FIPS code. These records join the tabular
//! indicator data to the boundary geometry and place the lab-metric
//! markers on the map.

pub mod fips;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of digits in a county FIPS code (state + county).
pub const REGION_CODE_LEN: usize = 5;

/// Five-digit, zero-padded county FIPS code (e.g. `"72001"`).
///
/// The first two digits are the state FIPS code, the last three the county
/// FIPS code. Always exactly five ASCII digits once constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    /// Parses a region code.
    ///
    /// Surrounding whitespace is ignored. A purely numeric value shorter
    /// than five digits has lost its leading zeros somewhere upstream and
    /// is zero-padded back to width.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRegionCodeError`] if the value is empty, contains
    /// non-digit characters, or is longer than five digits.
    pub fn parse(value: &str) -> Result<Self, InvalidRegionCodeError> {
        let trimmed = value.trim();

        if trimmed.is_empty()
            || trimmed.len() > REGION_CODE_LEN
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(InvalidRegionCodeError {
                value: value.to_string(),
            });
        }

        if trimmed.len() < REGION_CODE_LEN {
            log::warn!("Region code '{trimmed}' is missing leading zeros, padding to width");
        }

        Ok(Self(format!("{trimmed:0>REGION_CODE_LEN$}")))
    }

    /// Builds a region code from its state and county parts.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRegionCodeError`] if the parts are not two and
    /// three digits respectively.
    pub fn from_parts(state_fips: &str, county_fips: &str) -> Result<Self, InvalidRegionCodeError> {
        let state = state_fips.trim();
        let county = county_fips.trim();
        if state.len() != 2 || county.len() != 3 {
            return Err(InvalidRegionCodeError {
                value: format!("{state}{county}"),
            });
        }
        Self::parse(&format!("{state}{county}"))
    }

    /// Returns the full five-digit code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit state FIPS code.
    #[must_use]
    pub fn state_fips(&self) -> &str {
        &self.0[..2]
    }

    /// Three-digit county FIPS code.
    #[must_use]
    pub fn county_fips(&self) -> &str {
        &self.0[2..]
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegionCode {
    type Err = InvalidRegionCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = InvalidRegionCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

impl AsRef<str> for RegionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string is not a valid region code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRegionCodeError {
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for InvalidRegionCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid region code '{}': expected {REGION_CODE_LEN} digits",
            self.value
        )
    }
}

impl std::error::Error for InvalidRegionCodeError {}

/// A latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
}

impl Centroid {
    /// Creates a centroid, rejecting non-finite or out-of-range values.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
        {
            Some(Self { lat, lon })
        } else {
            None
        }
    }
}

/// A municipality as used by the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// County FIPS code.
    pub code: RegionCode,
    /// Display name (e.g. "Mayagüez").
    pub name: String,
    /// Marker position, when known.
    pub centroid: Option<Centroid>,
}

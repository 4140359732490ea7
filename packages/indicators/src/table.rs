//! The per-municipality indicator table.
//!
//! Code-like columns (county and state FIPS) are kept as strings so their
//! leading zeros survive. Every other column is numeric; cells that are
//! empty or do not parse as a finite number are treated as absent.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use sdoh_map_config::DataConfig;
use sdoh_map_geography_models::{Centroid, Region, RegionCode};

use crate::IndicatorError;

/// One municipality's row.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    /// Code, name, and (when the table has lat/lon) marker position.
    pub region: Region,
    /// State FIPS column, verbatim.
    pub state_fips: Option<String>,
    values: BTreeMap<String, f64>,
}

impl IndicatorRow {
    /// County code of this row.
    #[must_use]
    pub const fn code(&self) -> &RegionCode {
        &self.region.code
    }

    /// Value of a numeric column, `None` when absent or the column does
    /// not exist.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// Loaded indicator table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorTable {
    columns: Vec<String>,
    rows: Vec<IndicatorRow>,
}

/// Header positions of the identity columns.
struct IdentityColumns {
    code: usize,
    name: usize,
    state: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
}

impl IdentityColumns {
    fn locate(headers: &StringRecord, config: &DataConfig) -> Result<Self, IndicatorError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| IndicatorError::MissingColumn {
                column: name.to_string(),
            })
        };

        let lat = find(&config.lat_column);
        let lon = find(&config.lon_column);
        if lat.is_none() || lon.is_none() {
            log::info!(
                "Indicator table has no '{}'/'{}' columns; markers will use boundary centroids",
                config.lat_column,
                config.lon_column
            );
        }

        Ok(Self {
            code: require(&config.code_column)?,
            name: require(&config.name_column)?,
            state: config.state_column.as_deref().and_then(&find),
            lat,
            lon,
        })
    }

    fn contains(&self, idx: usize) -> bool {
        idx == self.code
            || idx == self.name
            || Some(idx) == self.state
            || Some(idx) == self.lat
            || Some(idx) == self.lon
    }
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl IndicatorTable {
    /// Loads the configured CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError`] if the file cannot be opened or parsed,
    /// or lacks the code or name column.
    pub fn from_path(path: &Path, config: &DataConfig) -> Result<Self, IndicatorError> {
        log::info!("Loading indicator table from {}", path.display());
        let file = File::open(path)?;
        let table = Self::from_reader(file, config)?;
        log::info!(
            "Loaded {} rows with {} indicator columns",
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }

    /// Parses a CSV document.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::MissingColumn`] if the code or name column
    /// is absent, [`IndicatorError::InvalidRegionCode`] for a malformed
    /// code, and [`IndicatorError::Csv`] for malformed CSV.
    pub fn from_reader<R: Read>(reader: R, config: &DataConfig) -> Result<Self, IndicatorError> {
        let mut rdr = ReaderBuilder::new().from_reader(reader);
        let headers = rdr.headers()?.clone();
        let identity = IdentityColumns::locate(&headers, config)?;

        let numeric: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !identity.contains(*i))
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        let mut rows = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, csv::Position::line);

            let raw_code = record.get(identity.code).unwrap_or("").trim();
            if raw_code.is_empty() {
                log::warn!("Line {line}: empty region code, skipping row");
                continue;
            }
            let code = RegionCode::parse(raw_code)
                .map_err(|source| IndicatorError::InvalidRegionCode { line, source })?;

            let name = record.get(identity.name).unwrap_or("").trim().to_string();

            let centroid = match (identity.lat, identity.lon) {
                (Some(lat), Some(lon)) => parse_number(record.get(lat))
                    .zip(parse_number(record.get(lon)))
                    .and_then(|(lat, lon)| Centroid::new(lat, lon)),
                _ => None,
            };

            let state_fips = identity
                .state
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let values = numeric
                .iter()
                .filter_map(|(i, column)| parse_number(record.get(*i)).map(|v| (column.clone(), v)))
                .collect();

            rows.push(IndicatorRow {
                region: Region {
                    code,
                    name,
                    centroid,
                },
                state_fips,
                values,
            });
        }

        Ok(Self {
            columns: numeric.into_iter().map(|(_, c)| c).collect(),
            rows,
        })
    }

    /// Numeric column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether a numeric column exists.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Fails with [`IndicatorError::MissingColumn`] unless the column exists.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require_column(&self, column: &str) -> Result<(), IndicatorError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(IndicatorError::MissingColumn {
                column: column.to_string(),
            })
        }
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    /// The first row with this code.
    #[must_use]
    pub fn row(&self, code: &RegionCode) -> Option<&IndicatorRow> {
        self.rows.iter().find(|r| r.code() == code)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One value per row, in row order.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::MissingColumn`] for an unknown column.
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>, IndicatorError> {
        self.require_column(column)?;
        Ok(self.rows.iter().map(|r| r.value(column)).collect())
    }

    /// The present values of a column.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::MissingColumn`] for an unknown column.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<f64>, IndicatorError> {
        self.require_column(column)?;
        Ok(self.rows.iter().filter_map(|r| r.value(column)).collect())
    }

    /// Minimum and maximum of a column, `None` when it has no values.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError::MissingColumn`] for an unknown column.
    pub fn range(&self, column: &str) -> Result<Option<(f64, f64)>, IndicatorError> {
        Ok(self
            .numeric_values(column)?
            .into_iter()
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
STATEFIPS,COUNTYFIPS,COUNTY,lat,lon,ACS_PCT_UNINSURED,bun
72,72001,Adjuntas,18.18,-66.75,5.2,14.5
72,72003,Aguada,18.38,-67.19,,12.0
72,72005,Aguadilla,,,7.9,NA
";

    fn load(csv: &str) -> Result<IndicatorTable, IndicatorError> {
        IndicatorTable::from_reader(csv.as_bytes(), &DataConfig::default())
    }

    fn code(s: &str) -> RegionCode {
        RegionCode::parse(s).unwrap()
    }

    #[test]
    fn loads_rows_and_numeric_columns() {
        let table = load(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns(), ["ACS_PCT_UNINSURED", "bun"]);
        assert!(!table.has_column("COUNTYFIPS"));
        assert!(!table.has_column("lat"));
    }

    #[test]
    fn keeps_leading_zeros_in_codes() {
        let csv = "STATEFIPS,COUNTYFIPS,COUNTY,x\n01,01001,Autauga,1\n";
        let table = load(csv).unwrap();
        assert_eq!(table.rows()[0].code().as_str(), "01001");
        assert_eq!(table.rows()[0].state_fips.as_deref(), Some("01"));
    }

    #[test]
    fn missing_and_unparseable_cells_are_absent() {
        let table = load(SAMPLE).unwrap();
        assert_eq!(
            table.values("ACS_PCT_UNINSURED").unwrap(),
            vec![Some(5.2), None, Some(7.9)]
        );
        assert_eq!(table.values("bun").unwrap(), vec![Some(14.5), Some(12.0), None]);
    }

    #[test]
    fn reads_centroids_when_present() {
        let table = load(SAMPLE).unwrap();
        let adjuntas = table.row(&code("72001")).unwrap();
        assert_eq!(adjuntas.region.name, "Adjuntas");
        assert_eq!(adjuntas.region.centroid, Centroid::new(18.18, -66.75));
        assert!(table.row(&code("72005")).unwrap().region.centroid.is_none());
    }

    #[test]
    fn computes_range() {
        let table = load(SAMPLE).unwrap();
        assert_eq!(table.range("bun").unwrap(), Some((12.0, 14.5)));
    }

    #[test]
    fn range_of_all_absent_column_is_none() {
        let csv = "COUNTYFIPS,COUNTY,x\n72001,Adjuntas,\n";
        assert_eq!(load(csv).unwrap().range("x").unwrap(), None);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let table = load(SAMPLE).unwrap();
        assert!(matches!(
            table.values("glucose"),
            Err(IndicatorError::MissingColumn { column }) if column == "glucose"
        ));
    }

    #[test]
    fn requires_code_column() {
        let csv = "COUNTY,x\nAdjuntas,1\n";
        assert!(matches!(
            load(csv),
            Err(IndicatorError::MissingColumn { column }) if column == "COUNTYFIPS"
        ));
    }

    #[test]
    fn skips_rows_without_code() {
        let csv = "COUNTYFIPS,COUNTY,x\n,Nowhere,1\n72001,Adjuntas,2\n";
        let table = load(csv).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn rejects_malformed_code_with_line() {
        let csv = "COUNTYFIPS,COUNTY,x\n72001,Adjuntas,1\nPR-01,Bad,2\n";
        assert!(matches!(
            load(csv),
            Err(IndicatorError::InvalidRegionCode { line: 3, .. })
        ));
    }

    #[test]
    fn works_without_optional_columns() {
        let csv = "COUNTYFIPS,COUNTY,bun\n72001,Adjuntas,10\n";
        let table = load(csv).unwrap();
        assert_eq!(table.columns(), ["bun"]);
        assert!(table.rows()[0].state_fips.is_none());
        assert!(table.rows()[0].region.centroid.is_none());
    }
}

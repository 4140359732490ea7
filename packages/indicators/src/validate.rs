//! Integrity checks over the static inputs.
//!
//! Nothing here stops the dashboard from serving; the report is printed by
//! the `validate` command and logged when the server starts.

use std::collections::BTreeSet;
use std::fmt;

use sdoh_map_geography_models::RegionCode;
use sdoh_map_indicators_models::MenuKind;

use crate::catalog::RegionCatalog;
use crate::registry::Menus;
use crate::table::IndicatorTable;

/// A menu column the table does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMenuColumn {
    /// Menu the entry belongs to.
    pub menu: MenuKind,
    /// Entry key.
    pub key: String,
    /// The absent column.
    pub column: String,
}

/// Findings of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Rows checked.
    pub row_count: usize,
    /// Table codes with no region record.
    pub unmatched_codes: Vec<RegionCode>,
    /// Codes that appear on more than one row.
    pub duplicate_codes: Vec<RegionCode>,
    /// Menu keys with no table column.
    pub missing_columns: Vec<MissingMenuColumn>,
    /// Configured color columns with no table column.
    pub missing_color_columns: Vec<MissingMenuColumn>,
    /// Rows that cannot be placed on the map.
    pub rows_without_centroid: Vec<RegionCode>,
}

impl ValidationReport {
    /// Whether nothing but missing centroids was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unmatched_codes.is_empty()
            && self.duplicate_codes.is_empty()
            && self.missing_columns.is_empty()
            && self.missing_color_columns.is_empty()
    }

    /// Logs every finding at the matching level.
    pub fn log(&self) {
        if self.is_clean() {
            log::info!("Indicator data checks passed ({} rows)", self.row_count);
        } else {
            log::warn!("Indicator data has integrity problems:\n{self}");
        }
        if !self.rows_without_centroid.is_empty() {
            log::warn!(
                "{} rows have no centroid and will not get a marker",
                self.rows_without_centroid.len()
            );
        }
    }
}

fn write_codes(f: &mut fmt::Formatter<'_>, title: &str, codes: &[RegionCode]) -> fmt::Result {
    if codes.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title} ({}):", codes.len())?;
    for code in codes {
        writeln!(f, "  {code}")?;
    }
    Ok(())
}

fn write_columns(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    columns: &[MissingMenuColumn],
) -> fmt::Result {
    if columns.is_empty() {
        return Ok(());
    }
    writeln!(f, "{title} ({}):", columns.len())?;
    for c in columns {
        writeln!(f, "  {} menu '{}': column '{}'", c.menu, c.key, c.column)?;
    }
    Ok(())
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checked {} rows", self.row_count)?;
        write_codes(f, "Codes with no matching region", &self.unmatched_codes)?;
        write_codes(f, "Duplicate codes", &self.duplicate_codes)?;
        write_columns(f, "Menu keys missing from table", &self.missing_columns)?;
        write_columns(f, "Color columns missing from table", &self.missing_color_columns)?;
        write_codes(f, "Rows without a centroid", &self.rows_without_centroid)?;
        if self.is_clean() {
            writeln!(f, "OK")?;
        }
        Ok(())
    }
}

/// Checks the table against the region catalog and both menus.
#[must_use]
pub fn validate(table: &IndicatorTable, regions: &RegionCatalog, menus: &Menus) -> ValidationReport {
    let mut report = ValidationReport {
        row_count: table.len(),
        ..ValidationReport::default()
    };

    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for row in table.rows() {
        let code = row.code();
        if !seen.insert(code.clone()) {
            duplicates.insert(code.clone());
        }
        if !regions.contains(code) {
            report.unmatched_codes.push(code.clone());
        }
        if row.region.centroid.is_none() && regions.centroid(code).is_none() {
            report.rows_without_centroid.push(code.clone());
        }
    }
    report.duplicate_codes = duplicates.into_iter().collect();

    for menu in [&menus.sdoh, &menus.lab] {
        for entry in &menu.entries {
            if !table.has_column(&entry.key) {
                report.missing_columns.push(MissingMenuColumn {
                    menu: menu.kind,
                    key: entry.key.clone(),
                    column: entry.key.clone(),
                });
            }
            if let Some(color) = entry.color_column.as_ref().filter(|c| !table.has_column(c)) {
                report.missing_color_columns.push(MissingMenuColumn {
                    menu: menu.kind,
                    key: entry.key.clone(),
                    column: color.clone(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdoh_map_config::DataConfig;
    use sdoh_map_geography_models::{Centroid, Region};

    fn full_header() -> String {
        let menus = Menus::embedded();
        let mut cols = vec!["COUNTYFIPS".to_string(), "COUNTY".to_string()];
        for entry in menus.sdoh.entries.iter().chain(&menus.lab.entries) {
            cols.push(entry.key.clone());
            cols.extend(entry.color_column.clone());
        }
        cols.join(",")
    }

    fn row(code: &str, name: &str, width: usize) -> String {
        let mut cells = vec![code.to_string(), name.to_string()];
        cells.extend(std::iter::repeat_n("1".to_string(), width - 2));
        cells.join(",")
    }

    fn table(rows: &[(&str, &str)]) -> IndicatorTable {
        let header = full_header();
        let width = header.split(',').count();
        let mut csv = header;
        for (code, name) in rows {
            csv.push('\n');
            csv.push_str(&row(code, name, width));
        }
        csv.push('\n');
        IndicatorTable::from_reader(csv.as_bytes(), &DataConfig::default()).unwrap()
    }

    #[test]
    fn complete_table_is_clean() {
        let report = validate(
            &table(&[("72001", "Adjuntas"), ("72153", "Yauco")]),
            &RegionCatalog::municipios(),
            &Menus::embedded(),
        );
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.row_count, 2);
        // The municipio list has no centroids and the table has no lat/lon.
        assert_eq!(report.rows_without_centroid.len(), 2);
    }

    #[test]
    fn reports_unmatched_and_duplicate_codes() {
        let report = validate(
            &table(&[("72001", "Adjuntas"), ("72001", "Again"), ("01001", "Autauga")]),
            &RegionCatalog::municipios(),
            &Menus::embedded(),
        );
        assert!(!report.is_clean());
        assert_eq!(report.unmatched_codes, [RegionCode::parse("01001").unwrap()]);
        assert_eq!(report.duplicate_codes, [RegionCode::parse("72001").unwrap()]);
    }

    #[test]
    fn reports_missing_menu_columns() {
        let csv = "COUNTYFIPS,COUNTY,bun,color_bun\n72001,Adjuntas,1,1\n";
        let table = IndicatorTable::from_reader(csv.as_bytes(), &DataConfig::default()).unwrap();
        let report = validate(&table, &RegionCatalog::municipios(), &Menus::embedded());

        // 5 SDOH + 3 lab keys absent, each with its color column.
        assert_eq!(report.missing_columns.len(), 8);
        assert_eq!(report.missing_color_columns.len(), 8);
        assert!(!report.missing_columns.iter().any(|c| c.key == "bun"));
        assert!(
            report
                .missing_columns
                .iter()
                .any(|c| c.menu == MenuKind::Sdoh && c.column == "ACS_PCT_UNINSURED")
        );
    }

    #[test]
    fn catalog_centroid_counts_as_placement() {
        let regions = RegionCatalog::from_regions([Region {
            code: RegionCode::parse("72001").unwrap(),
            name: "Adjuntas".to_string(),
            centroid: Centroid::new(18.18, -66.75),
        }]);
        let report = validate(&table(&[("72001", "Adjuntas")]), &regions, &Menus::embedded());
        assert!(report.rows_without_centroid.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn display_lists_findings() {
        let report = validate(
            &table(&[("01001", "Autauga")]),
            &RegionCatalog::municipios(),
            &Menus::embedded(),
        );
        let text = report.to_string();
        assert!(text.contains("Codes with no matching region (1):"));
        assert!(text.contains("  01001"));
        assert!(!text.contains("OK"));
    }
}

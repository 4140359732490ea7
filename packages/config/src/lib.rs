#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard configuration.
//!
//! Everything the server and CLI need to know about where the data lives,
//! how the legend is bucketed, how the map is framed, and where to listen
//! is read from a single `dashboard.toml`. Every section has defaults, so a
//! missing file or a partial file is fine. `BIND_ADDR` and `PORT` override
//! the `[server]` section.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file used when neither `--config` nor `DASHBOARD_CONFIG` is set.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

/// Public county boundary document covering every US county and Puerto Rico.
pub const DEFAULT_BOUNDARY_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/geojson-counties-fips.json";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`DashboardConfig`].
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value parsed but is out of range.
    #[error("Invalid configuration value for {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Static page text and branding.
    pub page: PageConfig,
    /// Indicator table location and column names.
    pub data: DataConfig,
    /// Boundary geometry source.
    pub boundaries: BoundaryConfig,
    /// Color legend bucketing.
    pub legend: LegendConfig,
    /// Map framing and colors.
    pub map: MapConfig,
    /// HTTP listener.
    pub server: ServerConfig,
}

/// Page title, branding, and footnote.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Main heading shown above the map.
    pub title: String,
    /// Short browser tab title.
    pub short_title: String,
    /// One-line description of the dashboard.
    pub about: String,
    /// Data attribution shown below the map.
    pub footnote: String,
    /// Branding images shown beside the heading.
    pub logos: Vec<LogoConfig>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Kidney Disease Lab Test / Social Determinants of Health (SDoH) - Puerto Rico"
                .to_string(),
            short_title: "PR Kidney Disease-SDOH".to_string(),
            about: "Dashboard with Kidney Disease Lab Data and Social Determinants of Health Indices"
                .to_string(),
            footnote: String::new(),
            logos: Vec::new(),
        }
    }
}

/// A linked branding image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogoConfig {
    /// Alt text.
    pub alt: String,
    /// Link target when the logo is clicked.
    pub href: String,
    /// Image URL.
    pub image: String,
}

/// Where the indicator table lives and which columns carry region identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Comma-separated indicator table.
    pub indicator_csv: PathBuf,
    /// Five-digit county FIPS column. Read as a string.
    pub code_column: String,
    /// Two-digit state FIPS column. Read as a string.
    pub state_column: Option<String>,
    /// Municipality display name column.
    pub name_column: String,
    /// Marker latitude column.
    pub lat_column: String,
    /// Marker longitude column.
    pub lon_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            indicator_csv: PathBuf::from("data/sdoh.csv"),
            code_column: "COUNTYFIPS".to_string(),
            state_column: Some("STATEFIPS".to_string()),
            name_column: "COUNTY".to_string(),
            lat_column: "lat".to_string(),
            lon_column: "lon".to_string(),
        }
    }
}

/// Boundary geometry document source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Remote `GeoJSON` document.
    pub url: String,
    /// Local `GeoJSON` file. Takes precedence over `url` when set.
    pub path: Option<PathBuf>,
    /// Only features in this state are kept.
    pub state_fips: String,
    /// Per-request timeout for the remote fetch.
    pub timeout_secs: u64,
    /// Attempts before giving up on the remote fetch.
    pub max_retries: u32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BOUNDARY_URL.to_string(),
            path: None,
            state_fips: "72".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

/// How the indicator legend is bucketed into tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LegendConfig {
    /// Number of equal percentile steps between the minimum and maximum.
    pub segments: usize,
    /// Breakpoints dropped from the low end before labelling.
    pub skip_leading: usize,
    /// Color-scale position of the first kept breakpoint.
    pub tick_start: f64,
    /// Color-scale distance between consecutive ticks.
    pub tick_step: f64,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            segments: 17,
            skip_leading: 3,
            tick_start: 3_000_000.0,
            tick_step: 1_000_000.0,
        }
    }
}

/// Map framing and styling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Latitude of the initial view center.
    pub center_lat: f64,
    /// Longitude of the initial view center.
    pub center_lon: f64,
    /// Initial zoom of the map projection.
    pub projection_scale: f64,
    /// Figure height in pixels.
    pub height: u32,
    /// Page and map background color.
    pub background: String,
    /// Color scale for the municipality fill.
    pub region_colorscale: String,
    /// Color scale for the lab-metric markers.
    pub point_colorscale: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 18.155,
            center_lon: -66.245,
            projection_scale: 172.0,
            height: 650,
            background: "#f5f5f5".to_string(),
            region_colorscale: "Purples".to_string(),
            point_colorscale: "Oranges".to_string(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
    /// Directory holding `index.html` and its assets.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: PathBuf::from("app"),
        }
    }
}

impl DashboardConfig {
    /// Parses and validates a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file at `path`, falling back to defaults when the
    /// file does not exist, then applies `BIND_ADDR` and `PORT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&content, path)?
        } else {
            log::info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Self::default()
        };

        config.apply_overrides(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("PORT").ok(),
        );

        Ok(config)
    }

    /// Overrides the listener address and port. Unparseable ports are
    /// ignored with a warning.
    pub fn apply_overrides(&mut self, bind_addr: Option<String>, port: Option<String>) {
        if let Some(addr) = bind_addr.filter(|a| !a.trim().is_empty()) {
            self.server.bind_addr = addr;
        }

        if let Some(port) = port {
            match port.trim().parse() {
                Ok(p) => self.server.port = p,
                Err(e) => log::warn!("Ignoring invalid PORT '{port}': {e}"),
            }
        }
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.legend.segments == 0 {
            return Err(ConfigError::Invalid {
                field: "legend.segments",
                message: "must be at least 1".to_string(),
            });
        }
        if self.legend.skip_leading > self.legend.segments {
            return Err(ConfigError::Invalid {
                field: "legend.skip_leading",
                message: format!(
                    "{} exceeds segments ({})",
                    self.legend.skip_leading, self.legend.segments
                ),
            });
        }
        if !(self.legend.tick_step.is_finite() && self.legend.tick_step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "legend.tick_step",
                message: "must be a positive number".to_string(),
            });
        }
        if self.boundaries.state_fips.len() != 2
            || !self.boundaries.state_fips.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::Invalid {
                field: "boundaries.state_fips",
                message: format!("'{}' is not a two-digit code", self.boundaries.state_fips),
            });
        }
        if self.boundaries.max_retries == 0 {
            return Err(ConfigError::Invalid {
                field: "boundaries.max_retries",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolves the config file path: explicit argument, then
/// `DASHBOARD_CONFIG`, then [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            std::env::var("DASHBOARD_CONFIG")
                .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<DashboardConfig, ConfigError> {
        DashboardConfig::from_toml_str(content, Path::new("test.toml"))
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.legend.segments, 17);
        assert_eq!(config.legend.skip_leading, 3);
        assert_eq!(config.data.code_column, "COUNTYFIPS");
        assert_eq!(config.boundaries.state_fips, "72");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [server]
            port = 9000

            [data]
            indicator_csv = "other.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.data.indicator_csv, PathBuf::from("other.csv"));
        assert_eq!(config.data.name_column, "COUNTY");
    }

    #[test]
    fn parses_logos() {
        let config = parse(
            r#"
            [[page.logos]]
            alt = "Logo"
            href = "https://example.org"
            image = "https://example.org/logo.png"
            "#,
        )
        .unwrap();
        assert_eq!(config.page.logos.len(), 1);
        assert_eq!(config.page.logos[0].alt, "Logo");
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = parse(include_str!("../../../dashboard.toml")).unwrap();
        assert_eq!(config.page.logos.len(), 2);
        assert!(config.page.footnote.starts_with("SDoHs were obtained"));
        assert_eq!(config.data, DataConfig::default());
        assert_eq!(config.boundaries, BoundaryConfig::default());
        assert_eq!(config.legend, LegendConfig::default());
        assert_eq!(config.map, MapConfig::default());
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn rejects_zero_segments() {
        let err = parse("[legend]\nsegments = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "legend.segments", .. }));
    }

    #[test]
    fn rejects_skip_beyond_segments() {
        let err = parse("[legend]\nsegments = 4\nskip_leading = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "legend.skip_leading", .. }));
    }

    #[test]
    fn rejects_bad_state_fips() {
        let err = parse("[boundaries]\nstate_fips = \"PR\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "boundaries.state_fips", .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(parse("[server"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn overrides_replace_listener() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(Some("0.0.0.0".to_string()), Some("3000".to_string()));
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn invalid_port_override_is_ignored() {
        let mut config = DashboardConfig::default();
        config.apply_overrides(None, Some("not-a-port".to_string()));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            resolve_path(Some(Path::new("custom.toml"))),
            PathBuf::from("custom.toml")
        );
    }
}

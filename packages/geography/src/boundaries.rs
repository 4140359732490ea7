//! Filtered municipality boundary set.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use geo::{Centroid as _, MultiPolygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson};
use sdoh_map_config::BoundaryConfig;
use sdoh_map_geography_models::fips::municipio_name;
use sdoh_map_geography_models::{Centroid, Region, RegionCode};

use crate::GeoError;
use crate::fetch::{build_client, fetch_geojson_with_retry};

/// One municipality polygon with its derived metadata.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// County FIPS code.
    pub code: RegionCode,
    /// Display name from the `NAME` property, else the FIPS table.
    pub name: String,
    /// Polygon geometry.
    pub polygon: MultiPolygon<f64>,
    /// Geometric centroid of `polygon`.
    pub centroid: Option<Centroid>,
}

/// The boundaries of a single state, indexed by region code.
///
/// Keeps the filtered `FeatureCollection` verbatim so it can be served to
/// the browser without re-encoding every polygon.
#[derive(Debug, Clone)]
pub struct BoundarySet {
    state_fips: String,
    boundaries: BTreeMap<RegionCode, Boundary>,
    collection: FeatureCollection,
}

impl BoundarySet {
    /// Loads the configured boundary document. A local `path` wins over
    /// the remote `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the document cannot be read, downloaded,
    /// or parsed, or contains no feature for the configured state.
    pub async fn load(config: &BoundaryConfig) -> Result<Self, GeoError> {
        let doc = if let Some(path) = &config.path {
            log::info!("Loading boundaries from {}", path.display());
            read_geojson_file(path)?
        } else {
            log::info!("Downloading boundaries from {}", config.url);
            let client = build_client(Duration::from_secs(config.timeout_secs))?;
            fetch_geojson_with_retry(&client, &config.url, config.max_retries).await?
        };

        let set = Self::from_geojson(doc, &config.state_fips)?;
        log::info!(
            "Loaded {} boundaries for state {}",
            set.len(),
            config.state_fips
        );
        Ok(set)
    }

    /// Parses a `GeoJSON` string and keeps the features of `state_fips`.
    ///
    /// # Errors
    ///
    /// See [`Self::from_geojson`].
    pub fn from_geojson_str(content: &str, state_fips: &str) -> Result<Self, GeoError> {
        Self::from_geojson(content.parse()?, state_fips)
    }

    /// Keeps the polygon features of `state_fips` from a parsed document.
    ///
    /// Features whose code cannot be determined or whose geometry is not a
    /// polygon are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Conversion`] if the document is not a
    /// `FeatureCollection` or no feature belongs to the state.
    pub fn from_geojson(doc: GeoJson, state_fips: &str) -> Result<Self, GeoError> {
        let GeoJson::FeatureCollection(collection) = doc else {
            return Err(GeoError::Conversion {
                message: "Boundary document must be a FeatureCollection".to_string(),
            });
        };

        let mut boundaries = BTreeMap::new();
        let mut kept = Vec::new();

        for mut feature in collection.features {
            let Some(code) = feature_code(&feature) else {
                log::warn!("Skipping boundary feature without a usable county code");
                continue;
            };

            if code.state_fips() != state_fips {
                continue;
            }

            let Some(polygon) = feature_polygon(&feature) else {
                log::warn!("Skipping boundary {code}: geometry is not a polygon");
                continue;
            };

            let centroid = polygon
                .centroid()
                .and_then(|p| Centroid::new(p.y(), p.x()));

            let name = feature_name(&feature)
                .or_else(|| municipio_name(code.county_fips()).map(str::to_string))
                .unwrap_or_else(|| code.to_string());

            if boundaries.contains_key(&code) {
                log::warn!("Duplicate boundary feature for {code}, keeping the first");
                continue;
            }

            let code_id = code.to_string();
            boundaries.insert(
                code.clone(),
                Boundary {
                    code,
                    name,
                    polygon,
                    centroid,
                },
            );
            // The page joins table rows to features by id.
            feature.id = Some(Id::String(code_id));
            kept.push(feature);
        }

        if boundaries.is_empty() {
            return Err(GeoError::Conversion {
                message: format!("Boundary document has no features for state {state_fips}"),
            });
        }

        Ok(Self {
            state_fips: state_fips.to_string(),
            boundaries,
            collection: FeatureCollection {
                bbox: None,
                features: kept,
                foreign_members: None,
            },
        })
    }

    /// State these boundaries were filtered to.
    #[must_use]
    pub fn state_fips(&self) -> &str {
        &self.state_fips
    }

    /// Number of municipalities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the set is empty. Never true for a successfully built set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Whether a municipality with this code exists.
    #[must_use]
    pub fn contains(&self, code: &RegionCode) -> bool {
        self.boundaries.contains_key(code)
    }

    /// Looks up one municipality.
    #[must_use]
    pub fn get(&self, code: &RegionCode) -> Option<&Boundary> {
        self.boundaries.get(code)
    }

    /// Centroid of one municipality.
    #[must_use]
    pub fn centroid(&self, code: &RegionCode) -> Option<Centroid> {
        self.boundaries.get(code).and_then(|b| b.centroid)
    }

    /// All municipalities in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.values()
    }

    /// All municipalities as region records.
    #[must_use]
    pub fn regions(&self) -> Vec<Region> {
        self.iter()
            .map(|b| Region {
                code: b.code.clone(),
                name: b.name.clone(),
                centroid: b.centroid,
            })
            .collect()
    }

    /// The filtered features, ready to serve.
    #[must_use]
    pub const fn feature_collection(&self) -> &FeatureCollection {
        &self.collection
    }
}

fn read_geojson_file(path: &Path) -> Result<GeoJson, GeoError> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.parse()?)
}

/// Determines a feature's county code from, in order: the feature `id`,
/// the `GEO_ID` property (`"0500000US72001"`), or the `STATE` and
/// `COUNTY` properties.
fn feature_code(feature: &Feature) -> Option<RegionCode> {
    if let Some(id) = &feature.id {
        let raw = match id {
            Id::String(s) => s.clone(),
            Id::Number(n) => n.to_string(),
        };
        if let Ok(code) = RegionCode::parse(&raw) {
            return Some(code);
        }
    }

    let props = feature.properties.as_ref()?;

    if let Some(geo_id) = props.get("GEO_ID").and_then(serde_json::Value::as_str)
        && let Some((_, suffix)) = geo_id.rsplit_once("US")
        && let Ok(code) = RegionCode::parse(suffix)
    {
        return Some(code);
    }

    let state = props.get("STATE").and_then(serde_json::Value::as_str)?;
    let county = props.get("COUNTY").and_then(serde_json::Value::as_str)?;
    RegionCode::from_parts(state, county).ok()
}

fn feature_name(feature: &Feature) -> Option<String> {
    feature
        .properties
        .as_ref()?
        .get("NAME")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn feature_polygon(feature: &Feature) -> Option<MultiPolygon<f64>> {
    let geom = feature.geometry.clone()?;
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two Puerto Rico squares plus one mainland county, in the shape of
    /// the public US-counties document.
    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "72001",
                "properties": {"GEO_ID": "0500000US72001", "STATE": "72", "COUNTY": "001", "NAME": "Adjuntas"},
                "geometry": {"type": "Polygon", "coordinates": [[[-67.0, 18.0], [-66.0, 18.0], [-66.0, 19.0], [-67.0, 19.0], [-67.0, 18.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"GEO_ID": "0500000US72003", "STATE": "72", "COUNTY": "003"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-66.0, 18.0], [-65.0, 18.0], [-65.0, 19.0], [-66.0, 19.0], [-66.0, 18.0]]]]}
            },
            {
                "type": "Feature",
                "id": "01001",
                "properties": {"STATE": "01", "COUNTY": "001", "NAME": "Autauga"},
                "geometry": {"type": "Polygon", "coordinates": [[[-87.0, 32.0], [-86.0, 32.0], [-86.0, 33.0], [-87.0, 33.0], [-87.0, 32.0]]]}
            }
        ]
    }"#;

    fn code(s: &str) -> RegionCode {
        RegionCode::parse(s).unwrap()
    }

    #[test]
    fn keeps_only_requested_state() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&code("72001")));
        assert!(set.contains(&code("72003")));
        assert!(!set.contains(&code("01001")));
        assert_eq!(set.feature_collection().features.len(), 2);
    }

    #[test]
    fn served_features_carry_region_ids() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        let ids: Vec<String> = set
            .feature_collection()
            .features
            .iter()
            .map(|f| match &f.id {
                Some(Id::String(s)) => s.clone(),
                other => panic!("unexpected id {other:?}"),
            })
            .collect();
        assert_eq!(ids, ["72001", "72003"]);
    }

    #[test]
    fn derives_code_from_geo_id_when_id_missing() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        assert!(set.get(&code("72003")).is_some());
    }

    #[test]
    fn falls_back_to_fips_table_for_names() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        assert_eq!(set.get(&code("72001")).unwrap().name, "Adjuntas");
        assert_eq!(set.get(&code("72003")).unwrap().name, "Aguada");
    }

    #[test]
    fn computes_centroids() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        let c = set.centroid(&code("72001")).unwrap();
        assert!((c.lat - 18.5).abs() < 1e-9);
        assert!((c.lon - -66.5).abs() < 1e-9);
    }

    #[test]
    fn regions_are_in_code_order() {
        let set = BoundarySet::from_geojson_str(SAMPLE, "72").unwrap();
        let codes: Vec<String> = set.regions().into_iter().map(|r| r.code.to_string()).collect();
        assert_eq!(codes, ["72001", "72003"]);
    }

    #[test]
    fn rejects_state_with_no_features() {
        let err = BoundarySet::from_geojson_str(SAMPLE, "06").unwrap_err();
        assert!(matches!(err, GeoError::Conversion { .. }));
    }

    #[test]
    fn rejects_non_collection_documents() {
        let point = r#"{"type": "Point", "coordinates": [-66.0, 18.0]}"#;
        assert!(matches!(
            BoundarySet::from_geojson_str(point, "72"),
            Err(GeoError::Conversion { .. })
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            BoundarySet::from_geojson_str("{not json", "72"),
            Err(GeoError::GeoJson(_))
        ));
    }
}

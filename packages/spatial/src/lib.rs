#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for municipality lookup.
//!
//! Builds an R-tree over the boundary polygons once at startup and answers
//! "which municipality contains this point" for map clicks.

use geo::{BoundingRect, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};
use sdoh_map_geography::boundaries::BoundarySet;
use sdoh_map_geography_models::RegionCode;

/// A boundary polygon stored in the R-tree with its code.
struct RegionEntry {
    code: RegionCode,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over municipality polygons.
pub struct RegionIndex {
    tree: RTree<RegionEntry>,
}

impl RegionIndex {
    /// Indexes every boundary in the set.
    #[must_use]
    pub fn build(boundaries: &BoundarySet) -> Self {
        let entries: Vec<RegionEntry> = boundaries
            .iter()
            .map(|b| RegionEntry {
                code: b.code.clone(),
                envelope: compute_envelope(&b.polygon),
                polygon: b.polygon.clone(),
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::info!("Indexed {} municipality polygons", tree.size());

        Self { tree }
    }

    /// Number of indexed polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Looks up the municipality containing a point.
    ///
    /// Municipalities tile the island without overlap, so first match wins.
    #[must_use]
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&RegionCode> {
        let point = geo::Point::new(lon, lat);
        let query_env = AABB::from_point([lon, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .find(|entry| entry.polygon.contains(&point))
            .map(|entry| &entry.code)
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "72001",
                "properties": {"NAME": "Adjuntas"},
                "geometry": {"type": "Polygon", "coordinates": [[[-67.0, 18.0], [-66.0, 18.0], [-66.0, 19.0], [-67.0, 19.0], [-67.0, 18.0]]]}
            },
            {
                "type": "Feature",
                "id": "72003",
                "properties": {"NAME": "Aguada"},
                "geometry": {"type": "Polygon", "coordinates": [[[-66.0, 18.0], [-65.0, 18.0], [-65.0, 19.0], [-66.0, 19.0], [-66.0, 18.0]]]}
            }
        ]
    }"#;

    fn index() -> RegionIndex {
        RegionIndex::build(&BoundarySet::from_geojson_str(SAMPLE, "72").unwrap())
    }

    #[test]
    fn indexes_every_boundary() {
        assert_eq!(index().len(), 2);
    }

    #[test]
    fn finds_containing_region() {
        let index = index();
        assert_eq!(index.lookup(-66.5, 18.5).map(RegionCode::as_str), Some("72001"));
        assert_eq!(index.lookup(-65.5, 18.5).map(RegionCode::as_str), Some("72003"));
    }

    #[test]
    fn misses_points_outside_every_region() {
        assert!(index().lookup(-70.0, 18.5).is_none());
        assert!(index().lookup(-66.5, 25.0).is_none());
    }
}

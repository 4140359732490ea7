//! The region reference set that indicator rows are matched against.

use std::collections::BTreeMap;

use sdoh_map_geography_models::fips::municipio_regions;
use sdoh_map_geography_models::{Centroid, Region, RegionCode};

/// Known regions keyed by code.
///
/// Built from the boundary document when it loaded, otherwise from the
/// embedded municipality list (which has no centroids).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCatalog {
    regions: BTreeMap<RegionCode, Region>,
}

impl RegionCatalog {
    /// Builds a catalog. Later duplicates of a code are ignored.
    #[must_use]
    pub fn from_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        let mut map = BTreeMap::new();
        for region in regions {
            map.entry(region.code.clone()).or_insert(region);
        }
        Self { regions: map }
    }

    /// The 78 Puerto Rico municipalities, without centroids.
    #[must_use]
    pub fn municipios() -> Self {
        Self::from_regions(municipio_regions())
    }

    /// Whether the code is a known region.
    #[must_use]
    pub fn contains(&self, code: &RegionCode) -> bool {
        self.regions.contains_key(code)
    }

    /// Looks up one region.
    #[must_use]
    pub fn get(&self, code: &RegionCode) -> Option<&Region> {
        self.regions.get(code)
    }

    /// Centroid of a region, when known.
    #[must_use]
    pub fn centroid(&self, code: &RegionCode) -> Option<Centroid> {
        self.regions.get(code).and_then(|r| r.centroid)
    }

    /// All regions in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

//! Puerto Rico municipality FIPS code utilities.
//!
//! Provides mappings between three-digit county FIPS codes and the display
//! names of the 78 municipalities.

use crate::{Region, RegionCode};

/// Puerto Rico state FIPS code.
pub const PUERTO_RICO_STATE_FIPS: &str = "72";

/// County FIPS code and display name for every municipality.
pub const MUNICIPIOS: &[(&str, &str)] = &[
    ("001", "Adjuntas"),
    ("003", "Aguada"),
    ("005", "Aguadilla"),
    ("007", "Aguas Buenas"),
    ("009", "Aibonito"),
    ("011", "Añasco"),
    ("013", "Arecibo"),
    ("015", "Arroyo"),
    ("017", "Barceloneta"),
    ("019", "Barranquitas"),
    ("021", "Bayamón"),
    ("023", "Cabo Rojo"),
    ("025", "Caguas"),
    ("027", "Camuy"),
    ("029", "Canóvanas"),
    ("031", "Carolina"),
    ("033", "Cataño"),
    ("035", "Cayey"),
    ("037", "Ceiba"),
    ("039", "Ciales"),
    ("041", "Cidra"),
    ("043", "Coamo"),
    ("045", "Comerío"),
    ("047", "Corozal"),
    ("049", "Culebra"),
    ("051", "Dorado"),
    ("053", "Fajardo"),
    ("054", "Florida"),
    ("055", "Guánica"),
    ("057", "Guayama"),
    ("059", "Guayanilla"),
    ("061", "Guaynabo"),
    ("063", "Gurabo"),
    ("065", "Hatillo"),
    ("067", "Hormigueros"),
    ("069", "Humacao"),
    ("071", "Isabela"),
    ("073", "Jayuya"),
    ("075", "Juana Díaz"),
    ("077", "Juncos"),
    ("079", "Lajas"),
    ("081", "Lares"),
    ("083", "Las Marías"),
    ("085", "Las Piedras"),
    ("087", "Loíza"),
    ("089", "Luquillo"),
    ("091", "Manatí"),
    ("093", "Maricao"),
    ("095", "Maunabo"),
    ("097", "Mayagüez"),
    ("099", "Moca"),
    ("101", "Morovis"),
    ("103", "Naguabo"),
    ("105", "Naranjito"),
    ("107", "Orocovis"),
    ("109", "Patillas"),
    ("111", "Peñuelas"),
    ("113", "Ponce"),
    ("115", "Quebradillas"),
    ("117", "Rincón"),
    ("119", "Río Grande"),
    ("121", "Sabana Grande"),
    ("123", "Salinas"),
    ("125", "San Germán"),
    ("127", "San Juan"),
    ("129", "San Lorenzo"),
    ("131", "San Sebastián"),
    ("133", "Santa Isabel"),
    ("135", "Toa Alta"),
    ("137", "Toa Baja"),
    ("139", "Trujillo Alto"),
    ("141", "Utuado"),
    ("143", "Vega Alta"),
    ("145", "Vega Baja"),
    ("147", "Vieques"),
    ("149", "Villalba"),
    ("151", "Yabucoa"),
    ("153", "Yauco"),
];

/// Maps a three-digit county FIPS code to the municipality name.
///
/// Returns `None` for unrecognized codes.
#[must_use]
pub fn municipio_name(county_fips: &str) -> Option<&'static str> {
    MUNICIPIOS
        .iter()
        .find(|(fips, _)| *fips == county_fips)
        .map(|(_, name)| *name)
}

/// Maps a municipality name to its three-digit county FIPS code.
///
/// Matching ignores case and surrounding whitespace but not accents, so
/// `"mayagüez"` matches while `"Mayaguez"` does not.
#[must_use]
pub fn municipio_fips(name: &str) -> Option<&'static str> {
    let wanted = name.trim().to_lowercase();
    MUNICIPIOS
        .iter()
        .find(|(_, n)| n.to_lowercase() == wanted)
        .map(|(fips, _)| *fips)
}

/// Returns every municipality as a [`Region`] with no centroid.
///
/// This is the region reference set used when no boundary document is
/// available to supply geometry.
#[must_use]
pub fn municipio_regions() -> Vec<Region> {
    MUNICIPIOS
        .iter()
        .filter_map(|(fips, name)| {
            RegionCode::from_parts(PUERTO_RICO_STATE_FIPS, fips)
                .ok()
                .map(|code| Region {
                    code,
                    name: (*name).to_string(),
                    centroid: None,
                })
        })
        .collect()
}

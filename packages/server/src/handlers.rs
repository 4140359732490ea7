//! HTTP handler functions for the dashboard API.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use sdoh_map_geography_models::{Region, RegionCode};
use sdoh_map_indicators::IndicatorError;
use sdoh_map_indicators::breakpoints::column_legend;
use sdoh_map_server_models::{
    ApiError, ApiHealth, ApiLegend, ApiMenu, ApiMenus, ApiPage, ApiRegion, ApiRegionDetail,
    ApiRegionValue, LegendQueryParams, MapQueryParams, PointQueryParams,
};

use crate::AppState;

/// Maps an encoding failure to a status code.
///
/// Unknown keys are a bad request. A menu key the data cannot answer is
/// a data problem and only warns.
fn indicator_error_response(e: &IndicatorError) -> HttpResponse {
    match e {
        IndicatorError::UnknownKey(_) => HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
        IndicatorError::MissingColumn { .. } | IndicatorError::EmptyColumn { .. } => {
            log::warn!("Indicator data cannot answer request: {e}");
            HttpResponse::UnprocessableEntity().json(ApiError::new(e.to_string()))
        }
        _ => {
            log::error!("Failed to encode map: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to encode map"))
        }
    }
}

/// Turns a malformed query string into a JSON 400.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ApiError::new(err.to_string()));
    InternalError::from_response(err, response).into()
}

/// An empty query value (`?indicator=`) selects the default like an
/// absent one.
fn menu_key(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn boundaries_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ApiError::new("Boundary document is not loaded"))
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        boundaries_loaded: state.boundaries.is_some(),
        region_count: state.regions.len(),
    })
}

/// `GET /api/page`
pub async fn page(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiPage::from(&state.config.page))
}

/// `GET /api/menus`
pub async fn menus(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiMenus {
        sdoh: ApiMenu::from(&state.menus.sdoh),
        lab: ApiMenu::from(&state.menus.lab),
    })
}

/// `GET /api/map`
///
/// Builds the full figure for the selected indicator and lab metric.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    match state
        .encoder()
        .encode(menu_key(params.indicator.as_deref()), menu_key(params.lab.as_deref()))
    {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => indicator_error_response(&e),
    }
}

/// `GET /api/legend`
///
/// Returns only the fill legend ticks for one indicator.
pub async fn legend(
    state: web::Data<AppState>,
    params: web::Query<LegendQueryParams>,
) -> HttpResponse {
    let entry = match state.menus.sdoh.resolve(menu_key(params.indicator.as_deref())) {
        Ok(entry) => entry,
        Err(e) => return indicator_error_response(&IndicatorError::from(e)),
    };

    match column_legend(&state.table, entry, &state.config.legend) {
        Ok(ticks) => HttpResponse::Ok().json(ApiLegend {
            indicator: entry.key.clone(),
            label: entry.label.clone(),
            ticks,
        }),
        Err(e) => indicator_error_response(&e),
    }
}

/// `GET /api/boundaries`
///
/// Serves the filtered boundary `FeatureCollection`.
pub async fn boundaries(state: web::Data<AppState>) -> HttpResponse {
    state
        .boundaries
        .as_ref()
        .map_or_else(boundaries_unavailable, |set| {
            HttpResponse::Ok().json(set.feature_collection())
        })
}

/// `GET /api/regions`
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    let regions: Vec<ApiRegion> = state.regions.iter().map(ApiRegion::from).collect();
    HttpResponse::Ok().json(regions)
}

/// `GET /api/regions/{code}`
///
/// One region with every menu value labelled.
pub async fn region_detail(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let code = match RegionCode::parse(&path) {
        Ok(code) => code,
        Err(e) => return HttpResponse::BadRequest().json(ApiError::new(e.to_string())),
    };

    let row = state.table.row(&code);
    let known = state.regions.get(&code);

    let region = match (row, known) {
        (Some(row), known) => Region {
            centroid: row
                .region
                .centroid
                .or_else(|| known.and_then(|r| r.centroid)),
            ..row.region.clone()
        },
        (None, Some(known)) => known.clone(),
        (None, None) => {
            return HttpResponse::NotFound().json(ApiError::new(format!("Unknown region {code}")));
        }
    };

    let values = [&state.menus.sdoh, &state.menus.lab]
        .into_iter()
        .flat_map(|menu| {
            menu.entries.iter().map(move |entry| ApiRegionValue {
                menu: menu.kind,
                key: entry.key.clone(),
                label: entry.label.clone(),
                value: row.and_then(|r| r.value(&entry.key)),
            })
        })
        .collect();

    HttpResponse::Ok().json(ApiRegionDetail {
        region: ApiRegion::from(&region),
        values,
    })
}

/// `GET /api/regions/at`
///
/// Returns the region containing the point, or `null`.
pub async fn region_at(
    state: web::Data<AppState>,
    params: web::Query<PointQueryParams>,
) -> HttpResponse {
    let Some(index) = &state.region_index else {
        return boundaries_unavailable();
    };

    let found: Option<ApiRegion> = index
        .lookup(params.lon, params.lat)
        .and_then(|code| state.regions.get(code))
        .map(ApiRegion::from);

    HttpResponse::Ok().json(found)
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use sdoh_map_config::{DashboardConfig, LegendConfig};
    use sdoh_map_geography::boundaries::BoundarySet;
    use sdoh_map_indicators::table::IndicatorTable;
    use serde_json::Value;

    use crate::{AppState, configure_api};

    const TABLE: &str = "\
STATEFIPS,COUNTYFIPS,COUNTY,lat,lon,ACS_PCT_HH_PUB_ASSIST,color_ACS_PCT_HH_PUB_ASSIST,albumin_urine,color_albu_urine
72,72001,Adjuntas,18.18,-66.75,40.4,5000000,12.3,0.4
72,72003,Aguada,,,35.0,4000000,,
72,72005,Aguadilla,18.43,-67.15,30.2,3000000,20.0,0.9
";

    const BOUNDARIES: &str = r#"{
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
                "geometry": {"type": "Polygon", "coordinates": [[[-68.0, 18.0], [-67.0, 18.0], [-67.0, 19.0], [-68.0, 19.0], [-68.0, 18.0]]]}
            }
        ]
    }"#;

    fn state(with_boundaries: bool) -> web::Data<AppState> {
        let mut config = DashboardConfig::default();
        config.legend = LegendConfig {
            segments: 4,
            skip_leading: 1,
            tick_start: 0.0,
            tick_step: 1.0,
        };
        let table = IndicatorTable::from_reader(TABLE.as_bytes(), &config.data).unwrap();
        let boundaries =
            with_boundaries.then(|| BoundarySet::from_geojson_str(BOUNDARIES, "72").unwrap());
        web::Data::new(AppState::new(config, table, boundaries))
    }

    async fn get(state: web::Data<AppState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).configure(configure_api)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_boundary_state() {
        let (status, body) = get(state(true), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["boundariesLoaded"], true);
        assert_eq!(body["regionCount"], 2);

        let (_, body) = get(state(false), "/api/health").await;
        assert_eq!(body["boundariesLoaded"], false);
        assert_eq!(body["regionCount"], 78);
    }

    #[actix_web::test]
    async fn page_returns_configured_title() {
        let (status, body) = get(state(false), "/api/page").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["shortTitle"], "PR Kidney Disease-SDOH");
    }

    #[actix_web::test]
    async fn menus_list_defaults() {
        let (_, body) = get(state(false), "/api/menus").await;
        assert_eq!(body["sdoh"]["defaultKey"], "ACS_PCT_HH_PUB_ASSIST");
        assert_eq!(body["lab"]["defaultKey"], "albumin_urine");
        assert_eq!(body["sdoh"]["entries"].as_array().unwrap().len(), 5);
        assert_eq!(body["lab"]["entries"].as_array().unwrap().len(), 4);
    }

    #[actix_web::test]
    async fn map_uses_defaults() {
        let (status, body) = get(state(true), "/api/map").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selection"]["indicator"], "ACS_PCT_HH_PUB_ASSIST");
        assert_eq!(body["choropleth"]["locations"].as_array().unwrap().len(), 3);
        // Aguadilla has a position but no boundary, so only two markers.
        let markers = body["overlay"]["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1]["code"], "72003");
        assert_eq!(body["frame"]["height"], 650);
    }

    #[actix_web::test]
    async fn map_treats_empty_keys_as_defaults() {
        let (status, body) = get(state(true), "/api/map?indicator=&lab=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selection"]["indicator"], "ACS_PCT_HH_PUB_ASSIST");
        assert_eq!(body["selection"]["lab"], "albumin_urine");

        let (status, body) = get(state(false), "/api/legend?indicator=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicator"], "ACS_PCT_HH_PUB_ASSIST");
    }

    #[actix_web::test]
    async fn map_rejects_unknown_indicator() {
        let (status, body) = get(state(true), "/api/map?indicator=NOPE").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("NOPE"));
    }

    #[actix_web::test]
    async fn map_reports_indicator_missing_from_data() {
        let (status, _) = get(state(true), "/api/map?indicator=ACS_PCT_UNINSURED").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn legend_returns_ticks() {
        let (status, body) = get(state(false), "/api/legend").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicator"], "ACS_PCT_HH_PUB_ASSIST");
        // 4 segments keep 4 cuts without the median; one is skipped.
        assert_eq!(body["ticks"].as_array().unwrap().len(), 3);
        assert_eq!(body["ticks"][2]["label"], "40");
    }

    #[actix_web::test]
    async fn legend_rejects_lab_key() {
        let (status, _) = get(state(false), "/api/legend?indicator=bun").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn boundaries_are_served_when_loaded() {
        let (status, body) = get(state(true), "/api/boundaries").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn boundaries_unavailable_without_document() {
        let (status, body) = get(state(false), "/api/boundaries").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn regions_list_catalog() {
        let (_, body) = get(state(true), "/api/regions").await;
        let regions = body.as_array().unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0]["code"], "72001");
        assert!(regions[0]["centroid"].is_object());
    }

    #[actix_web::test]
    async fn region_detail_labels_values() {
        let (status, body) = get(state(true), "/api/regions/72003").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Aguada");
        // Row has no lat/lon, so the boundary centroid fills in.
        assert!((body["centroid"]["lat"].as_f64().unwrap() - 18.5).abs() < 1e-9);

        let values = body["values"].as_array().unwrap();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0]["key"], "ACS_PCT_HH_PUB_ASSIST");
        assert_eq!(values[0]["value"], 35.0);
        assert_eq!(values[5]["menu"], "lab");
        assert!(values[5]["value"].is_null());
    }

    #[actix_web::test]
    async fn region_detail_status_codes() {
        let (status, _) = get(state(true), "/api/regions/72999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(state(true), "/api/regions/PR-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn region_at_finds_containing_polygon() {
        let (status, body) = get(state(true), "/api/regions/at?lat=18.5&lon=-66.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "72001");

        let (status, body) = get(state(true), "/api/regions/at?lat=10.0&lon=-60.0").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[actix_web::test]
    async fn malformed_query_returns_json_error() {
        let (status, body) = get(state(true), "/api/regions/at?lon=-66.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("lat"));

        let (status, body) = get(state(true), "/api/regions/at?lat=north&lon=-66.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn region_at_unavailable_without_boundaries() {
        let (status, _) = get(state(false), "/api/regions/at?lat=18.5&lon=-66.5").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

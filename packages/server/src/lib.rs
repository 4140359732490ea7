#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the SDOH map dashboard.
//!
//! Loads the indicator table and the municipality boundaries once at
//! startup and serves the JSON API the static page draws from. Every map
//! request recomputes its encoding from the shared, read-only state.
//!
//! A failed boundary download does not stop the server: region matching
//! falls back to the embedded municipality list and `/api/boundaries`
//! answers 503 until the process is restarted.

mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use sdoh_map_config::DashboardConfig;
use sdoh_map_geography::boundaries::BoundarySet;
use sdoh_map_indicators::IndicatorError;
use sdoh_map_indicators::catalog::RegionCatalog;
use sdoh_map_indicators::encoding::MapEncoder;
use sdoh_map_indicators::registry::Menus;
use sdoh_map_indicators::table::IndicatorTable;
use sdoh_map_indicators::validate::{ValidationReport, validate};
use sdoh_map_spatial::RegionIndex;
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The indicator table could not be loaded.
    #[error(transparent)]
    Indicators(#[from] IndicatorError),

    /// Binding or running the HTTP server failed.
    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Effective configuration.
    pub config: DashboardConfig,
    /// Indicator table.
    pub table: IndicatorTable,
    /// Both menus.
    pub menus: Menus,
    /// Regions rows are matched against.
    pub regions: RegionCatalog,
    /// Filtered boundary document, when it loaded.
    pub boundaries: Option<BoundarySet>,
    /// Point lookup over `boundaries`.
    pub region_index: Option<RegionIndex>,
}

impl AppState {
    /// Assembles the state from already-loaded inputs.
    ///
    /// The region catalog comes from the boundaries when present, else
    /// from the embedded municipality list.
    #[must_use]
    pub fn new(
        config: DashboardConfig,
        table: IndicatorTable,
        boundaries: Option<BoundarySet>,
    ) -> Self {
        let regions = boundaries.as_ref().map_or_else(RegionCatalog::municipios, |b| {
            RegionCatalog::from_regions(b.regions())
        });
        let region_index = boundaries.as_ref().map(RegionIndex::build);

        Self {
            config,
            table,
            menus: Menus::embedded(),
            regions,
            boundaries,
            region_index,
        }
    }

    /// Loads the indicator table and boundaries named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`IndicatorError`] if the indicator table cannot be loaded.
    /// Boundary failures are logged and leave `boundaries` empty.
    pub async fn load(config: DashboardConfig) -> Result<Self, IndicatorError> {
        let table = IndicatorTable::from_path(&config.data.indicator_csv, &config.data)?;

        let boundaries = match BoundarySet::load(&config.boundaries).await {
            Ok(set) => Some(set),
            Err(e) => {
                log::error!(
                    "Failed to load boundaries, continuing with the embedded municipality list: {e}"
                );
                None
            }
        };

        Ok(Self::new(config, table, boundaries))
    }

    /// Encoder over this state's data.
    #[must_use]
    pub const fn encoder(&self) -> MapEncoder<'_> {
        MapEncoder {
            table: &self.table,
            menus: &self.menus,
            regions: &self.regions,
            legend: &self.config.legend,
            map: &self.config.map,
        }
    }

    /// Checks the loaded data for integrity problems.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        validate(&self.table, &self.regions, &self.menus)
    }
}

/// Registers the `/api` routes. Query strings that fail to deserialize
/// answer with a JSON error body like every other failure.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/page", web::get().to(handlers::page))
            .route("/menus", web::get().to(handlers::menus))
            .route("/map", web::get().to(handlers::map))
            .route("/legend", web::get().to(handlers::legend))
            .route("/boundaries", web::get().to(handlers::boundaries))
            .route("/regions", web::get().to(handlers::regions))
            .route("/regions/at", web::get().to(handlers::region_at))
            .route("/regions/{code}", web::get().to(handlers::region_detail)),
    );
}

/// Starts the dashboard server.
///
/// Loads the data, logs the integrity report, and starts the Actix-Web
/// HTTP server. The caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`) and for initialising logging.
///
/// # Errors
///
/// Returns [`ServerError`] if the indicator table cannot be loaded or the
/// HTTP server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> Result<(), ServerError> {
    let state = AppState::load(config).await?;
    state.validate().log();

    let bind_addr = state.config.server.bind_addr.clone();
    let port = state.config.server.port;
    let static_dir = state.config.server.static_dir.clone();
    let state = web::Data::new(state);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve the dashboard page
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

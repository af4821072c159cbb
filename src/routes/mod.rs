pub mod aggregates;
pub mod chart;
pub mod export;
pub mod health;
mod rate_limit;
pub mod readings;
pub mod stations;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use rate_limit::ClientIpKeyExtractor;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::stations::{find_station, norm_name};

/// Resolve a station name to the label used in the dataset.
///
/// Matching ignores case, accents, spacing and punctuation. Dataset stations win
/// over the catalog; a catalog station without data resolves to its
/// catalog name (and simply yields empty results).
pub fn resolve_station(state: &AppState, name: &str) -> AppResult<String> {
    let key = norm_name(name);

    if let Some(found) = state
        .dataset
        .stations()
        .into_iter()
        .find(|s| norm_name(s) == key)
    {
        return Ok(found.to_string());
    }

    find_station(name)
        .map(|s| s.name.to_string())
        .ok_or_else(|| AppError::NotFound(format!("Station '{name}' not found")))
}

/// Resolve the measurement column of a request, defaulting to the first
/// dataset column.
pub fn resolve_column(state: &AppState, column: Option<&str>) -> AppResult<String> {
    match column {
        Some(c) if state.dataset.column_index(c).is_some() => Ok(c.to_string()),
        Some(c) => Err(AppError::BadRequest(format!("Unknown column: {c}"))),
        None => state
            .dataset
            .columns()
            .first()
            .cloned()
            .ok_or_else(|| AppError::NotFound("Dataset has no measurement columns".to_string())),
    }
}

/// Split a comma-separated query value, dropping empty items.
pub fn split_list(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        stations::list_columns,
        stations::list_stations,
        stations::get_station_statistics,
        readings::get_station_readings,
        aggregates::get_station_aggregates,
        chart::get_station_chart,
    ),
    components(
        schemas(
            health::HealthResponse,
            stations::StationResponse,
            stations::LatestReading,
            stations::StatisticsResponse,
            export::TableResponse,
            export::ColumnData,
            chart::ChartResponse,
            crate::pipeline::LinePoint,
            crate::pipeline::Statistics,
            crate::pipeline::SummaryKind,
            crate::pipeline::BucketWidth,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "stations", description = "Stations, columns and summary statistics"),
        (name = "readings", description = "Filtered raw readings"),
        (name = "aggregates", description = "Hourly and daily bucket summaries"),
        (name = "chart", description = "Gap-aware chart series"),
    ),
    info(
        title = "BASWAP API",
        description = "Time-series API for buoy-based water-quality monitoring",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            rate = %format!("{}/s burst {}", config.rate_limit_per_second, config.rate_limit_burst),
            bulk_concurrent = config.bulk_concurrent_limit,
            "Rate limiting configured"
        );
    }

    let api_routes_base = Router::new()
        .route("/columns", get(stations::list_columns))
        .route("/stations", get(stations::list_stations))
        .route(
            "/stations/{station}/statistics",
            get(stations::get_station_statistics),
        )
        .route(
            "/stations/{station}/readings",
            get(readings::get_station_readings),
        )
        .route(
            "/stations/{station}/aggregates/{resolution}",
            get(aggregates::get_station_aggregates),
        )
        .route(
            "/stations/{station}/chart/{resolution}",
            get(chart::get_station_chart),
        );

    let api_routes = if config.disable_rate_limiting {
        api_routes_base
    } else {
        let limiter = GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor)
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .finish()
            .expect("Failed to create rate limiter");

        api_routes_base.layer(GovernorLayer {
            config: Arc::new(limiter),
        })
    }
    .layer(RequestBodyLimitLayer::new(64 * 1024));

    // Health check routes (NO rate limiting)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

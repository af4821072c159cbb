use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::common::AppState;
use crate::error::AppResult;
use crate::pipeline::{latest_reading, statistics, FilterRequest};
use crate::routes::{resolve_column, resolve_station};
use crate::stations::{norm_name, STATIONS};

use super::types::{
    LatestReading, StationResponse, StationStatisticsQuery, StationsQuery, StatisticsResponse,
};

/// List measurement columns
#[utoipa::path(
    get,
    path = "/api/columns",
    responses(
        (status = 200, description = "Columns retrieved successfully", body = Vec<String>),
    ),
    tag = "stations"
)]
pub async fn list_columns(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.dataset.columns().to_vec())
}

/// List all stations
///
/// Catalog stations first, followed by any station present only in the
/// dataset. Each entry carries the latest reading of the chosen column.
#[utoipa::path(
    get,
    path = "/api/stations",
    params(StationsQuery),
    responses(
        (status = 200, description = "Stations retrieved successfully", body = Vec<StationResponse>),
        (status = 400, description = "Unknown column"),
    ),
    tag = "stations"
)]
pub async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationsQuery>,
) -> AppResult<Json<Vec<StationResponse>>> {
    // An explicit unknown column is an error; an empty dataset just has no latest values.
    let column = match query.column.as_deref() {
        Some(c) => Some(resolve_column(&state, Some(c))?),
        None => resolve_column(&state, None).ok(),
    };

    let dataset_stations = state.dataset.stations();
    let latest = |name: &str| {
        column
            .as_deref()
            .and_then(|c| latest_reading(&state.dataset, name, c))
            .map(|(time, value)| LatestReading { time, value })
    };

    let mut response: Vec<StationResponse> = STATIONS
        .iter()
        .map(|s| {
            let data_name = dataset_stations
                .iter()
                .find(|d| norm_name(d) == norm_name(s.name))
                .copied();
            StationResponse {
                name: s.name.to_string(),
                latitude: Some(s.latitude),
                longitude: Some(s.longitude),
                buoy: s.buoy,
                has_data: data_name.is_some(),
                latest: data_name.and_then(latest),
            }
        })
        .collect();

    for name in dataset_stations {
        if !STATIONS.iter().any(|s| norm_name(s.name) == norm_name(name)) {
            response.push(StationResponse {
                name: name.to_string(),
                latitude: None,
                longitude: None,
                buoy: false,
                has_data: true,
                latest: latest(name),
            });
        }
    }

    Ok(Json(response))
}

/// Get summary statistics for a specific station
///
/// Maximum, minimum, mean and sample standard deviation of one column over
/// the station's readings in the date window.
#[utoipa::path(
    get,
    path = "/api/stations/{station}/statistics",
    params(
        ("station" = String, Path, description = "Station name (case-insensitive)"),
        StationStatisticsQuery
    ),
    responses(
        (status = 200, description = "Statistics computed successfully", body = StatisticsResponse),
        (status = 400, description = "Unknown column"),
        (status = 404, description = "Station not found"),
    ),
    tag = "stations"
)]
pub async fn get_station_statistics(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Query(query): Query<StationStatisticsQuery>,
) -> AppResult<Json<StatisticsResponse>> {
    let station = resolve_station(&state, &station)?;
    let column = resolve_column(&state, query.column.as_deref())?;

    let filtered = FilterRequest {
        station: Some(station.clone()),
        date_from: query.from,
        date_to: query.to,
    }
    .apply(&state.dataset);

    let statistics = statistics(&filtered, &column)?;

    Ok(Json(StatisticsResponse {
        station,
        column,
        from: query.from,
        to: query.to,
        statistics,
    }))
}

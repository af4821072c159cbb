use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{BucketWidth, FilterRequest};
use crate::routes::export::{self, default_format};
use crate::routes::{resolve_station, split_list};

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationReadingsQuery {
    /// First calendar day (inclusive, YYYY-MM-DD). Both days are required for any data.
    pub from: Option<NaiveDate>,
    /// Last calendar day (inclusive, YYYY-MM-DD). Swapped with `from` if earlier.
    pub to: Option<NaiveDate>,
    /// Columns to include (comma-separated, default: all)
    pub columns: Option<String>,
    /// Response format: json (default), ndjson, csv
    #[serde(default = "default_format")]
    pub format: String,
}

/// Get readings for a specific station
///
/// Returns the raw readings of one station within an inclusive date
/// window, sorted by time. Timestamps are local (UTC+7) wall-clock.
/// Supports JSON, CSV, and NDJSON formats.
#[utoipa::path(
    get,
    path = "/api/stations/{station}/readings",
    params(
        ("station" = String, Path, description = "Station name (case-insensitive)"),
        StationReadingsQuery
    ),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = export::TableResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 404, description = "Station not found"),
    ),
    tag = "readings"
)]
pub async fn get_station_readings(
    State(state): State<AppState>,
    Path(station): Path<String>,
    Query(query): Query<StationReadingsQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let station = resolve_station(&state, &station)?;
    let format = export::determine_format(&query.format, &headers)?;

    let requested = split_list(query.columns.as_deref());
    if let Some(unknown) = requested
        .iter()
        .find(|c| state.dataset.column_index(c).is_none())
    {
        return Err(AppError::BadRequest(format!("Unknown column: {unknown}")));
    }

    let filtered = FilterRequest {
        station: Some(station.clone()),
        date_from: query.from,
        date_to: query.to,
    }
    .apply(&state.dataset);

    let table = if requested.is_empty() {
        filtered
    } else {
        filtered.select(&requested)
    };

    tracing::debug!(station = %station, rows = table.len(), "readings");
    export::respond(&state, format, station, BucketWidth::None, table)
}

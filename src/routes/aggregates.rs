use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Response,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::AppState;
use crate::error::AppResult;
use crate::pipeline::{aggregate_labeled, BucketWidth, FilterRequest};
use crate::routes::export::{self, default_format};
use crate::routes::{resolve_column, resolve_station, split_list};

pub fn default_summaries() -> String {
    "Max".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationAggregatesQuery {
    /// First calendar day (inclusive, YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last calendar day (inclusive, YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Measurement column to summarize (default: first dataset column)
    pub column: Option<String>,
    /// Summary kinds, comma-separated subset of Min, Max, Median (default: Max)
    #[serde(default = "default_summaries")]
    pub summaries: String,
    /// Response format: json (default), ndjson, csv
    #[serde(default = "default_format")]
    pub format: String,
}

/// Get bucket summaries for a specific station
///
/// Bins the station's readings in the date window into hour or day
/// buckets (anchored at local midnight) and returns one row per bucket and
/// summary kind. `Min`/`Max` rows keep the timestamp of the real reading;
/// `Median` rows are stamped with the bucket start. Resolution `None`
/// returns the filtered readings unchanged.
#[utoipa::path(
    get,
    path = "/api/stations/{station}/aggregates/{resolution}",
    params(
        ("station" = String, Path, description = "Station name (case-insensitive)"),
        ("resolution" = String, Path, description = "Bucket width: None, Hour, Day"),
        StationAggregatesQuery
    ),
    responses(
        (status = 200, description = "Aggregates retrieved successfully", body = export::TableResponse),
        (status = 400, description = "Invalid resolution, summary kind or column"),
        (status = 404, description = "Station not found"),
    ),
    tag = "aggregates"
)]
pub async fn get_station_aggregates(
    State(state): State<AppState>,
    Path((station, resolution)): Path<(String, String)>,
    Query(query): Query<StationAggregatesQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let station = resolve_station(&state, &station)?;
    let column = resolve_column(&state, query.column.as_deref())?;
    let format = export::determine_format(&query.format, &headers)?;
    let width: BucketWidth = resolution.parse()?;

    let filtered = FilterRequest {
        station: Some(station.clone()),
        date_from: query.from,
        date_to: query.to,
    }
    .apply(&state.dataset);

    let summaries = split_list(Some(&query.summaries));
    let table = aggregate_labeled(&filtered, &column, &resolution, &summaries)?;

    tracing::debug!(
        station = %station,
        resolution = %width,
        input_rows = filtered.len(),
        rows = table.len(),
        "aggregates"
    );
    export::respond(&state, format, station, width, table)
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::error::AppResult;
use crate::pipeline::{
    aggregate_labeled, chart_series, BucketWidth, CategoryColumn, FilterRequest, LinePoint,
    SummaryKind,
};
use crate::routes::aggregates::default_summaries;
use crate::routes::{resolve_column, resolve_station, split_list};

/// Points of history handed to the forecaster.
const FORECAST_HISTORY: usize = 7;

/// Category label of forecast overlay points.
const FORECAST_CATEGORY: &str = "Predicted";

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationChartQuery {
    /// First calendar day (inclusive, YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last calendar day (inclusive, YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Measurement column to plot (default: first dataset column)
    pub column: Option<String>,
    /// Summary kinds, comma-separated subset of Min, Max, Median (default: Max)
    #[serde(default = "default_summaries")]
    pub summaries: String,
    /// Overlay a short-horizon forecast (hourly view only)
    #[serde(default)]
    pub forecast: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChartResponse {
    pub station: String,
    pub column: String,
    /// Resolution actually rendered (falls back to None on invalid input)
    pub resolution: BucketWidth,
    /// Gaps longer than this many seconds break the line
    pub max_gap_seconds: i64,
    /// Line points, including gap sentinels (value null, gap true)
    pub points: Vec<LinePoint>,
    /// Forecast overlay, starting at the last observed point
    pub forecast: Option<Vec<LinePoint>>,
    /// Set when the request was invalid and a fallback series is shown
    pub warning: Option<String>,
}

/// Get a chart-ready series for a specific station
///
/// Filters and aggregates like the aggregates endpoint, then inserts a
/// null-valued sentinel in the middle of every gap longer than the view's
/// threshold so the chart breaks the line over outages. Invalid
/// resolution or summary labels do not fail the request: the filtered raw
/// series is returned with a `warning` instead.
#[utoipa::path(
    get,
    path = "/api/stations/{station}/chart/{resolution}",
    params(
        ("station" = String, Path, description = "Station name (case-insensitive)"),
        ("resolution" = String, Path, description = "Bucket width: None, Hour, Day"),
        StationChartQuery
    ),
    responses(
        (status = 200, description = "Chart series built successfully", body = ChartResponse),
        (status = 400, description = "Unknown column"),
        (status = 404, description = "Station not found"),
    ),
    tag = "chart"
)]
pub async fn get_station_chart(
    State(state): State<AppState>,
    Path((station, resolution)): Path<(String, String)>,
    Query(query): Query<StationChartQuery>,
) -> AppResult<Json<ChartResponse>> {
    let station = resolve_station(&state, &station)?;
    let column = resolve_column(&state, query.column.as_deref())?;

    let filtered = FilterRequest {
        station: Some(station.clone()),
        date_from: query.from,
        date_to: query.to,
    }
    .apply(&state.dataset);

    let summaries = split_list(Some(&query.summaries));
    let (table, width, warning) =
        match aggregate_labeled(&filtered, &column, &resolution, &summaries) {
            Ok(table) => {
                let width = resolution.parse().unwrap_or(BucketWidth::None);
                (table, width, None)
            }
            Err(rejected) => (
                rejected.fallback,
                BucketWidth::None,
                Some(rejected.error.to_string()),
            ),
        };

    let category = (width != BucketWidth::None).then_some(CategoryColumn::SummaryKind);
    let thresholds = &state.config.gap_thresholds;
    let points = chart_series(&table, &column, category, width, thresholds)?;

    let forecast = (query.forecast && width == BucketWidth::Hour)
        .then(|| forecast_overlay(&state, &points, &summaries))
        .flatten();

    Ok(Json(ChartResponse {
        station,
        column,
        resolution: width,
        max_gap_seconds: thresholds.for_width(width).num_seconds(),
        points,
        forecast,
        warning,
    }))
}

/// Forecast continuing the first requested summary line, one bucket per
/// step, anchored at its last observed point.
fn forecast_overlay(
    state: &AppState,
    points: &[LinePoint],
    summaries: &[&str],
) -> Option<Vec<LinePoint>> {
    let series: String = summaries
        .first()
        .and_then(|s| s.parse::<SummaryKind>().ok())
        .unwrap_or(SummaryKind::Max)
        .label()
        .to_string();

    let observed: Vec<(NaiveDateTime, f64)> = points
        .iter()
        .filter(|p| !p.gap && p.category.as_deref() == Some(series.as_str()))
        .filter_map(|p| p.value.map(|v| (p.time, v)))
        .collect();
    if observed.len() < 2 {
        return None;
    }
    let &(last_time, last_value) = observed.last()?;

    let history: Vec<f64> = observed
        .iter()
        .rev()
        .take(FORECAST_HISTORY)
        .rev()
        .map(|&(_, v)| v)
        .collect();
    let step = BucketWidth::Hour.duration()?;
    let prediction = state
        .forecaster
        .predict(&history, state.config.forecast_horizon, BucketWidth::Hour);

    let mut overlay = vec![LinePoint::new(last_time, Some(last_value)).with_category(FORECAST_CATEGORY)];
    let mut time = last_time;
    for value in prediction.median {
        time += step;
        overlay.push(LinePoint::new(time, Some(value)).with_category(FORECAST_CATEGORY));
    }

    tracing::debug!(history = history.len(), steps = overlay.len() - 1, "forecast overlay");
    Some(overlay)
}

//! Table serialization for data endpoints: JSON, CSV and NDJSON.
//!
//! Bulk formats are streamed through a channel so large windows never
//! sit fully rendered in memory.

use axum::{
    http::{
        header::{self, HeaderMap, HeaderValue},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::OwnedSemaphorePermit;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{BucketWidth, SummaryKind};
use crate::table::ObservationTable;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
    Ndjson,
}

/// Pick the response format: an explicit query value wins, then the
/// `Accept` header, then JSON.
pub fn determine_format(query_format: &str, headers: &HeaderMap) -> AppResult<Format> {
    match query_format.to_lowercase().as_str() {
        "csv" => return Ok(Format::Csv),
        "ndjson" => return Ok(Format::Ndjson),
        "json" => {}
        other => {
            return Err(AppError::BadRequest(format!(
                "Invalid format: {other}. Must be one of: json, ndjson, csv"
            )));
        }
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
    {
        if accept_str.contains("application/x-ndjson") {
            return Ok(Format::Ndjson);
        }
        if accept_str.contains("text/csv") {
            return Ok(Format::Csv);
        }
    }

    Ok(Format::Json)
}

/// Columnar table: `times[i]` pairs with `columns[j].values[i]`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TableResponse {
    pub station: String,
    pub resolution: BucketWidth,
    /// First timestamp (null if no data)
    pub start: Option<NaiveDateTime>,
    /// Last timestamp (null if no data)
    pub end: Option<NaiveDateTime>,
    /// Local (UTC+7) wall-clock timestamps
    pub times: Vec<NaiveDateTime>,
    /// Summary kind per row, present for aggregated output
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub summary_kinds: Vec<Option<SummaryKind>>,
    pub columns: Vec<ColumnData>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColumnData {
    pub name: String,
    /// Values array (same length as times, null for missing data)
    pub values: Vec<Option<f64>>,
}

impl TableResponse {
    /// Rows without a parseable timestamp are left out.
    pub fn from_table(station: String, resolution: BucketWidth, table: &ObservationTable) -> Self {
        let rows: Vec<_> = table.normalized_rows().collect();

        let times: Vec<NaiveDateTime> = rows.iter().map(|(t, _)| *t).collect();
        let summary_kinds = if rows.iter().any(|(_, r)| r.summary.is_some()) {
            rows.iter().map(|(_, r)| r.summary).collect()
        } else {
            Vec::new()
        };
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnData {
                name: name.clone(),
                values: rows.iter().map(|(_, r)| r.value(i)).collect(),
            })
            .collect();

        Self {
            station,
            resolution,
            start: times.iter().min().copied(),
            end: times.iter().max().copied(),
            times,
            summary_kinds,
            columns,
        }
    }
}

/// Render `table` in the requested format.
///
/// Bulk formats take a permit from the bulk semaphore first; when none is
/// free the request is rejected with 503.
pub fn respond(
    state: &AppState,
    format: Format,
    station: String,
    resolution: BucketWidth,
    table: ObservationTable,
) -> AppResult<Response> {
    match format {
        Format::Json => {
            Ok(Json(TableResponse::from_table(station, resolution, &table)).into_response())
        }
        Format::Csv | Format::Ndjson => {
            let permit = state.bulk_permits.clone().try_acquire_owned().map_err(|_| {
                tracing::warn!(
                    format = ?format,
                    status = StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                    "bulk_request_rejected"
                );
                AppError::ServiceUnavailable(
                    "Too many concurrent bulk requests. Please try again later.".to_string(),
                )
            })?;
            if format == Format::Csv {
                build_csv_response(table, permit)
            } else {
                build_ndjson_response(table, permit)
            }
        }
    }
}

fn csv_line(fields: &[String]) -> Result<String, std::io::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields).map_err(std::io::Error::other)?;
    let bytes = writer.into_inner().map_err(|e| std::io::Error::other(e.to_string()))?;
    String::from_utf8(bytes).map_err(std::io::Error::other)
}

fn build_csv_response(table: ObservationTable, permit: OwnedSemaphorePermit) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let _permit = permit;
        let tagged = table.rows().iter().any(|r| r.summary.is_some());

        // Header row: timestamp, station, columns..., summary_kind
        let mut header = vec!["timestamp".to_string(), "station".to_string()];
        header.extend(table.columns().iter().cloned());
        if tagged {
            header.push("summary_kind".to_string());
        }
        if tx.send(csv_line(&header)).await.is_err() {
            return;
        }

        for (time, row) in table.normalized_rows() {
            let mut fields = vec![
                time.format(TIMESTAMP_FORMAT).to_string(),
                row.station.clone().unwrap_or_default(),
            ];
            fields.extend(
                (0..table.columns().len())
                    .map(|i| row.value(i).map(|v| v.to_string()).unwrap_or_default()),
            );
            if tagged {
                fields.push(row.summary.map(|k| k.to_string()).unwrap_or_default());
            }
            if tx.send(csv_line(&fields)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn build_ndjson_response(
    table: ObservationTable,
    permit: OwnedSemaphorePermit,
) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let _permit = permit;
        for (time, row) in table.normalized_rows() {
            let mut obj = serde_json::Map::new();
            obj.insert(
                "timestamp".to_string(),
                serde_json::json!(time.format(TIMESTAMP_FORMAT).to_string()),
            );
            if let Some(station) = &row.station {
                obj.insert("station".to_string(), serde_json::json!(station));
            }
            for (i, name) in table.columns().iter().enumerate() {
                obj.insert(
                    name.clone(),
                    row.value(i)
                        .map_or(serde_json::Value::Null, |v| serde_json::json!(v)),
                );
            }
            if let Some(kind) = row.summary {
                obj.insert("summary_kind".to_string(), serde_json::json!(kind.label()));
            }

            let line = format!("{}\n", serde_json::Value::Object(obj));
            if tx.send(Ok(line)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-ndjson"),
        )
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

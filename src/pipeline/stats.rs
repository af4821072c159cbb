use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::PipelineError;
use crate::table::ObservationTable;

/// Descriptive statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Statistics {
    pub count: usize,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub mean: Option<f64>,
    /// Sample standard deviation; needs at least two values.
    pub std_dev: Option<f64>,
}

/// Statistics over the non-null values of `column`.
///
/// # Errors
///
/// Returns `PipelineError::UnknownColumn` if the column does not exist.
pub fn statistics(table: &ObservationTable, column: &str) -> Result<Statistics, PipelineError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| PipelineError::UnknownColumn(column.to_string()))?;
    let values: Vec<f64> = table.rows().iter().filter_map(|r| r.value(idx)).collect();

    let count = values.len();
    if count == 0 {
        return Ok(Statistics {
            count,
            max: None,
            min: None,
            mean: None,
            std_dev: None,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (count > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    Ok(Statistics {
        count,
        max: values.iter().copied().reduce(f64::max),
        min: values.iter().copied().reduce(f64::min),
        mean: Some(mean),
        std_dev,
    })
}

/// Most recent non-null reading of `column` for `station`.
///
/// Ties on the timestamp resolve to the later row in table order.
#[must_use]
pub fn latest_reading(
    table: &ObservationTable,
    station: &str,
    column: &str,
) -> Option<(NaiveDateTime, f64)> {
    let idx = table.column_index(column)?;
    table
        .normalized_rows()
        .filter(|(_, r)| r.station.as_deref() == Some(station))
        .filter_map(|(t, r)| r.value(idx).map(|v| (t, v)))
        .fold(None, |latest, (t, v)| match latest {
            Some((lt, _)) if lt > t => latest,
            _ => Some((t, v)),
        })
}

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::{is_forecast_column, BucketWidth, PipelineError, SummaryKind};
use crate::table::{Observation, ObservationTable, Timestamp};

/// Parameters of one aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub target_column: String,
    pub bucket_width: BucketWidth,
    summaries: Vec<SummaryKind>,
}

impl AggregationRequest {
    /// Duplicate summary kinds are dropped; the first request order is kept
    /// for output concatenation.
    #[must_use]
    pub fn new(
        target_column: impl Into<String>,
        bucket_width: BucketWidth,
        summaries: impl IntoIterator<Item = SummaryKind>,
    ) -> Self {
        let mut unique = Vec::new();
        for kind in summaries {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        Self {
            target_column: target_column.into(),
            bucket_width,
            summaries: unique,
        }
    }

    /// Build a request from the settings UI labels.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` for an unknown width or summary label.
    pub fn parse<S: AsRef<str>>(
        target_column: &str,
        bucket_width: &str,
        summaries: &[S],
    ) -> Result<Self, PipelineError> {
        let width = bucket_width.parse()?;
        let kinds = summaries
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<SummaryKind>, _>>()?;
        Ok(Self::new(target_column, width, kinds))
    }

    #[must_use]
    pub fn summaries(&self) -> &[SummaryKind] {
        &self.summaries
    }
}

/// An invalid request, carrying the untouched input so callers can still
/// render something.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct Rejected {
    pub error: PipelineError,
    pub fallback: ObservationTable,
}

/// Aggregate with labels straight from the settings UI.
///
/// Width `None` is the identity and ignores the summary labels entirely.
///
/// # Errors
///
/// Returns `Rejected` (with the input as fallback) for an unknown width,
/// summary kind, or target column.
pub fn aggregate_labeled<S: AsRef<str>>(
    table: &ObservationTable,
    target_column: &str,
    bucket_width: &str,
    summaries: &[S],
) -> Result<ObservationTable, Rejected> {
    let reject = |error: PipelineError| {
        tracing::warn!(%error, "aggregation request rejected");
        Rejected {
            error,
            fallback: table.clone(),
        }
    };

    let width: BucketWidth = bucket_width.parse().map_err(reject)?;
    if width == BucketWidth::None {
        return Ok(table.clone());
    }

    let request = AggregationRequest::parse(target_column, bucket_width, summaries).map_err(reject)?;
    aggregate(table, &request)
}

/// Bin `table` into buckets and compute the requested summaries.
///
/// Output schema: the target column followed by any forecast columns
/// (names starting with `predict`, any case); each row is tagged with its
/// [`SummaryKind`]. Per-kind outputs appear in request order, each sorted
/// by bucket.
///
/// - `Median` rows are stamped with the bucket start.
/// - `Min`/`Max` rows are the real observations attaining the extreme; on
///   ties the first one in original table order wins.
/// - Buckets with no non-null target value produce no row.
/// - Forecast columns carry the last non-null value seen in the bucket.
/// - With no summary kinds the normalized rows are returned sorted by
///   time, untagged.
///
/// Rows with unparseable timestamps are excluded.
///
/// # Errors
///
/// Returns `Rejected` if the target column does not exist (unless the
/// width is `None`, which always returns the input unchanged).
pub fn aggregate(
    table: &ObservationTable,
    request: &AggregationRequest,
) -> Result<ObservationTable, Rejected> {
    if request.bucket_width == BucketWidth::None {
        return Ok(table.clone());
    }

    let Some(target) = table.column_index(&request.target_column) else {
        let error = PipelineError::UnknownColumn(request.target_column.clone());
        tracing::warn!(%error, "aggregation request rejected");
        return Err(Rejected {
            error,
            fallback: table.clone(),
        });
    };

    let rows: Vec<(NaiveDateTime, &Observation)> = table.normalized_rows().collect();
    if rows.len() < table.len() {
        tracing::debug!(
            dropped = table.len() - rows.len(),
            "rows with unparseable timestamps excluded"
        );
    }

    if request.summaries.is_empty() {
        return Ok(sorted_untagged(table, rows));
    }

    let forecast_cols: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|&(i, name)| i != target && is_forecast_column(name))
        .map(|(i, _)| i)
        .collect();

    // Members keep original table order within each bucket.
    let mut buckets: BTreeMap<NaiveDateTime, Vec<(NaiveDateTime, &Observation)>> = BTreeMap::new();
    for (t, row) in rows {
        buckets
            .entry(request.bucket_width.floor(t))
            .or_default()
            .push((t, row));
    }

    let forecasts: BTreeMap<NaiveDateTime, Vec<Option<f64>>> = buckets
        .iter()
        .map(|(start, members)| (*start, last_values(members, &forecast_cols)))
        .collect();

    let mut columns = vec![request.target_column.clone()];
    columns.extend(forecast_cols.iter().map(|&i| table.columns()[i].clone()));
    let mut out = ObservationTable::new(columns);

    for &kind in &request.summaries {
        for (start, members) in &buckets {
            let summary = match kind {
                SummaryKind::Median => median(members.iter().filter_map(|(_, r)| r.value(target)))
                    .map(|v| (*start, v)),
                SummaryKind::Min => extreme(members, target, |candidate, best| candidate < best),
                SummaryKind::Max => extreme(members, target, |candidate, best| candidate > best),
            };
            let Some((t, value)) = summary else {
                continue;
            };

            let mut values = vec![Some(value)];
            values.extend(forecasts.get(start).into_iter().flatten().copied());
            out.push(Observation {
                timestamp: Timestamp::Local(t),
                station: None,
                values,
                summary: Some(kind),
            });
        }
    }

    tracing::debug!(
        width = %request.bucket_width,
        buckets = buckets.len(),
        rows = out.len(),
        "aggregated"
    );
    Ok(out)
}

fn sorted_untagged(
    table: &ObservationTable,
    mut rows: Vec<(NaiveDateTime, &Observation)>,
) -> ObservationTable {
    rows.sort_by_key(|(t, _)| *t);
    let mut out = table.empty_like();
    for (t, row) in rows {
        out.push(Observation {
            timestamp: Timestamp::Local(t),
            summary: None,
            ..row.clone()
        });
    }
    out
}

/// First member (in table order) whose target value beats all others
/// under `better`.
fn extreme(
    members: &[(NaiveDateTime, &Observation)],
    target: usize,
    better: impl Fn(f64, f64) -> bool,
) -> Option<(NaiveDateTime, f64)> {
    let mut best: Option<(NaiveDateTime, f64)> = None;
    for (t, row) in members {
        let Some(v) = row.value(target) else {
            continue;
        };
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((*t, v)),
        }
    }
    best
}

/// Median of the values, averaging the middle pair for even counts.
pub(crate) fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted.get(mid).copied()
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Last non-null value of each column in time order.
fn last_values(members: &[(NaiveDateTime, &Observation)], cols: &[usize]) -> Vec<Option<f64>> {
    let mut ordered: Vec<&(NaiveDateTime, &Observation)> = members.iter().collect();
    ordered.sort_by_key(|(t, _)| *t);

    cols.iter()
        .map(|&c| ordered.iter().rev().find_map(|(_, r)| r.value(c)))
        .collect()
}

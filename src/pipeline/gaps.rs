//! Gap-aware line series for charting.
//!
//! Monitoring buoys go offline. A line chart that simply connects the last
//! point before an outage to the first one after it shows data that never
//! existed. Before rendering, a missing-value sentinel is inserted in the
//! middle of every gap longer than the view's threshold so the line breaks
//! there.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use utoipa::ToSchema;

use super::{BucketWidth, PipelineError};
use crate::table::ObservationTable;

/// Largest silent interval, per view, still drawn as a continuous line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapThresholds {
    pub raw: TimeDelta,
    pub hour: TimeDelta,
    pub day: TimeDelta,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            raw: TimeDelta::minutes(60),
            hour: TimeDelta::hours(3),
            day: TimeDelta::days(3),
        }
    }
}

impl GapThresholds {
    #[must_use]
    pub const fn for_width(&self, width: BucketWidth) -> TimeDelta {
        match width {
            BucketWidth::None => self.raw,
            BucketWidth::Hour => self.hour,
            BucketWidth::Day => self.day,
        }
    }
}

/// Which row attribute splits a series into independent lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    SummaryKind,
    Station,
}

/// One point of a chart line.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LinePoint {
    /// Position on the time axis.
    pub time: NaiveDateTime,
    /// `None` on gap sentinels.
    pub value: Option<f64>,
    pub category: Option<String>,
    /// Display label, formatted from the bucket containing `time`.
    pub label: Option<String>,
    /// True for inserted sentinels.
    pub gap: bool,
}

impl LinePoint {
    #[must_use]
    pub fn new(time: NaiveDateTime, value: Option<f64>) -> Self {
        Self {
            time,
            value,
            category: None,
            label: None,
            gap: false,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Insert a sentinel at the midpoint of every gap longer than `max_gap`.
///
/// Points are grouped by category (all uncategorized points form one
/// group) and each group is sorted by time before gaps are measured.
/// Sentinels carry their group's category and no value. When
/// `label_format` is given, sentinels are labelled with their own time.
///
/// The result is stably sorted by time, so real points keep their relative
/// order and a sentinel never precedes a real point of its group stamped
/// at the same instant.
#[must_use]
pub fn break_gaps(
    points: &[LinePoint],
    max_gap: TimeDelta,
    label_format: Option<&str>,
) -> Vec<LinePoint> {
    let mut groups: BTreeMap<Option<&str>, Vec<&LinePoint>> = BTreeMap::new();
    for p in points {
        groups.entry(p.category.as_deref()).or_default().push(p);
    }

    let mut out = Vec::with_capacity(points.len());
    let mut inserted = 0usize;
    for (category, mut group) in groups {
        group.sort_by_key(|p| p.time);

        let mut sentinels = Vec::new();
        for pair in group.windows(2) {
            let [prev, next] = pair else {
                continue;
            };
            let delta = next.time - prev.time;
            if delta > max_gap {
                let time = prev.time + delta / 2;
                sentinels.push(LinePoint {
                    time,
                    value: None,
                    category: category.map(str::to_string),
                    label: label_format.map(|fmt| time.format(fmt).to_string()),
                    gap: true,
                });
            }
        }

        inserted += sentinels.len();
        out.extend(group.into_iter().cloned());
        out.extend(sentinels);
    }

    if inserted > 0 {
        tracing::debug!(inserted, %max_gap, "gap breaks inserted");
    }

    out.sort_by_key(|p| p.time);
    out
}

/// Turn a (possibly aggregated) table into gap-broken chart points.
///
/// Points sit at their exact timestamps; labels show the containing
/// bucket in the view's display format. The gap threshold comes from
/// `thresholds` for the given width. Rows without a parseable timestamp
/// are skipped; rows with a missing value stay as missing points.
///
/// # Errors
///
/// Returns `PipelineError::UnknownColumn` if `value_column` is absent.
pub fn chart_series(
    table: &ObservationTable,
    value_column: &str,
    category: Option<CategoryColumn>,
    width: BucketWidth,
    thresholds: &GapThresholds,
) -> Result<Vec<LinePoint>, PipelineError> {
    let idx = table
        .column_index(value_column)
        .ok_or_else(|| PipelineError::UnknownColumn(value_column.to_string()))?;
    let fmt = width.display_format();

    let points: Vec<LinePoint> = table
        .normalized_rows()
        .map(|(t, row)| LinePoint {
            time: t,
            value: row.value(idx),
            category: match category {
                Some(CategoryColumn::SummaryKind) => row.summary.map(|k| k.label().to_string()),
                Some(CategoryColumn::Station) => row.station.clone(),
                None => None,
            },
            label: Some(width.floor(t).format(fmt).to_string()),
            gap: false,
        })
        .collect();

    Ok(break_gaps(&points, thresholds.for_width(width), Some(fmt)))
}

//! Time-series aggregation and gap-aware charting pipeline.
//!
//! Raw observations flow through three stages:
//!
//! 1. [`filter`] restricts a station's table to an inclusive calendar-date
//!    window and normalizes timestamps.
//! 2. [`aggregate`] bins rows into hour or day buckets anchored at local
//!    midnight and emits `Min`/`Max`/`Median` summary rows.
//! 3. [`break_gaps`] inserts missing-value sentinels wherever consecutive
//!    points are further apart than a threshold, so charts do not draw a
//!    line across an outage.
//!
//! Every stage is a pure function of its inputs.

pub mod aggregate;
pub mod filter;
pub mod forecast;
pub mod gaps;
pub mod stats;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use aggregate::{aggregate, aggregate_labeled, AggregationRequest, Rejected};
pub use filter::{filter, FilterRequest};
pub use forecast::{Forecast, Forecaster, PersistenceForecaster, PredictionInterval};
pub use gaps::{break_gaps, chart_series, CategoryColumn, GapThresholds, LinePoint};
pub use stats::{latest_reading, statistics, Statistics};

/// Prefix (case-insensitive) of forecast columns that ride along with
/// aggregated output.
pub const FORECAST_COLUMN_PREFIX: &str = "predict";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("unknown bucket width '{0}', expected one of: None, Hour, Day")]
    UnknownBucketWidth(String),

    #[error("unknown summary kind '{0}', expected one of: Min, Max, Median")]
    UnknownSummaryKind(String),

    #[error("column '{0}' not found")]
    UnknownColumn(String),
}

/// Statistic computed per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum SummaryKind {
    Min,
    Max,
    Median,
}

impl SummaryKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Median => "Median",
        }
    }
}

impl std::fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SummaryKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Min" => Ok(Self::Min),
            "Max" => Ok(Self::Max),
            "Median" => Ok(Self::Median),
            other => Err(PipelineError::UnknownSummaryKind(other.to_string())),
        }
    }
}

/// Bucket width. The labels are exactly those used by the settings UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum BucketWidth {
    None,
    Hour,
    Day,
}

impl BucketWidth {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Hour => "Hour",
            Self::Day => "Day",
        }
    }

    /// Width of one bucket, `None` for the identity width.
    #[must_use]
    pub fn duration(self) -> Option<TimeDelta> {
        match self {
            Self::None => None,
            Self::Hour => Some(TimeDelta::hours(1)),
            Self::Day => Some(TimeDelta::days(1)),
        }
    }

    /// Start of the bucket containing `t`, anchored at local midnight.
    /// The identity width returns `t` itself.
    #[must_use]
    pub fn floor(self, t: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::None => t,
            Self::Hour => t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t),
            Self::Day => t.date().and_time(NaiveTime::MIN),
        }
    }

    /// Chart label format for this view.
    #[must_use]
    pub const fn display_format(self) -> &'static str {
        match self {
            Self::None => "%d/%m/%Y %H:%M:%S",
            Self::Hour => "%H:%M:%S",
            Self::Day => "%d/%m/%Y",
        }
    }
}

impl std::fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for BucketWidth {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" => Ok(Self::None),
            "Hour" => Ok(Self::Hour),
            "Day" => Ok(Self::Day),
            other => Err(PipelineError::UnknownBucketWidth(other.to_string())),
        }
    }
}

/// Whether a column carries forecast values.
#[must_use]
pub fn is_forecast_column(name: &str) -> bool {
    name.get(..FORECAST_COLUMN_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(FORECAST_COLUMN_PREFIX))
}

//! Timestamp normalization.
//!
//! Observations arrive with mixed timestamp representations: local
//! wall-clock values, offset-aware instants, or unparsed text straight from
//! a CSV cell. Before any comparison or bucketing they are normalized to a
//! single timezone-unaware form: the wall-clock time in the monitoring
//! site's civil timezone (UTC+7).
//!
//! Normalization is lossy-but-safe. A value that cannot be parsed becomes
//! `None` and the row carrying it is dropped by the pipeline, never
//! reported as an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Offset of the canonical local timezone, in seconds east of UTC.
pub const LOCAL_OFFSET_SECONDS: i32 = 7 * 3600;

/// Naive formats accepted for text timestamps, tried in order.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Offset-aware formats accepted for text timestamps, tried after RFC 3339.
const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// The canonical local timezone (UTC+7).
pub const LOCAL_OFFSET: FixedOffset = match FixedOffset::east_opt(LOCAL_OFFSET_SECONDS) {
    Some(offset) => offset,
    None => panic!("local offset out of range"),
};

/// A timestamp as it was ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// Already-normalized local wall-clock time.
    Local(NaiveDateTime),
    /// An instant carrying its own UTC offset.
    Aware(DateTime<FixedOffset>),
    /// Raw text, parsed lazily.
    Text(String),
    /// No value at all.
    Missing,
}

impl Timestamp {
    /// Local wall-clock value in the canonical timezone, or `None` when the
    /// value is missing or unparseable.
    #[must_use]
    pub fn normalize(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Local(t) => Some(*t),
            Self::Aware(t) => Some(to_local(t)),
            Self::Text(raw) => normalize_timestamp(raw),
            Self::Missing => None,
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Aware(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(value.to_string())
        }
    }
}

fn to_local(t: &DateTime<FixedOffset>) -> NaiveDateTime {
    t.with_timezone(&LOCAL_OFFSET).naive_local()
}

/// Parse and normalize a raw timestamp string.
///
/// Offset-aware input (`2024-05-01T01:00:00Z`, `2024-05-01 08:00:00+07:00`)
/// is converted to UTC+7 and the offset dropped. Naive input is taken as
/// local wall-clock already. A bare date maps to local midnight.
/// Anything else yields `None`.
#[must_use]
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(to_local(&t));
    }
    for fmt in AWARE_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(raw, fmt) {
            return Some(to_local(&t));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(t);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

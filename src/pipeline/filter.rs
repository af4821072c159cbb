use chrono::NaiveDate;

use crate::table::{Observation, ObservationTable, Timestamp};

/// Station and date window for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub station: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl FilterRequest {
    #[must_use]
    pub fn apply(&self, table: &ObservationTable) -> ObservationTable {
        filter(
            table,
            self.station.as_deref(),
            self.date_from,
            self.date_to,
        )
    }
}

/// Restrict `table` to one station and an inclusive calendar-date window.
///
/// - Either date missing yields an empty table with the same schema:
///   "no dates chosen yet" means nothing to show.
/// - Dates given in reverse order are swapped.
/// - When the table carries station ids, only rows whose station equals
///   `station` exactly are kept.
/// - Timestamps are normalized to local wall-clock time. Rows whose
///   timestamp cannot be parsed are dropped (lossy but safe).
///
/// The result is sorted ascending by timestamp; rows sharing a timestamp
/// keep their input order.
#[must_use]
pub fn filter(
    table: &ObservationTable,
    station: Option<&str>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> ObservationTable {
    let (Some(mut from), Some(mut to)) = (date_from, date_to) else {
        return table.empty_like();
    };
    if from > to {
        std::mem::swap(&mut from, &mut to);
    }

    let match_station = station.filter(|_| table.has_stations());

    let mut dropped = 0usize;
    let mut kept: Vec<(chrono::NaiveDateTime, &Observation)> = Vec::new();
    for row in table.rows() {
        if let Some(s) = match_station
            && row.station.as_deref() != Some(s)
        {
            continue;
        }

        let Some(t) = row.timestamp.normalize() else {
            dropped += 1;
            continue;
        };
        if (from..=to).contains(&t.date()) {
            kept.push((t, row));
        }
    }

    if dropped > 0 {
        tracing::debug!(dropped, "rows with unparseable timestamps excluded");
    }

    kept.sort_by_key(|(t, _)| *t);

    let mut out = table.empty_like();
    for (t, row) in kept {
        out.push(Observation {
            timestamp: Timestamp::Local(t),
            ..row.clone()
        });
    }
    out
}

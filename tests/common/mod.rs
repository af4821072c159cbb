//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use baswap_api::table::{Observation, ObservationTable};

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

pub fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).unwrap()
}

/// Single-column table of `(time, value)` rows, no station ids.
pub fn series(rows: &[(NaiveDateTime, Option<f64>)]) -> ObservationTable {
    ObservationTable::with_rows(
        vec!["EC[g/l]".to_string()],
        rows.iter()
            .map(|&(t, v)| Observation::new(t, vec![v]))
            .collect(),
    )
}

/// Two stations, three days of readings around a one-day outage at VGU.
pub fn two_station_table() -> ObservationTable {
    let mut rows = Vec::new();
    for (station, base) in [("Vĩnh Long", 1.0), ("VGU", 10.0)] {
        for d in 1..=3 {
            if station == "VGU" && d == 2 {
                continue;
            }
            for h in [0, 6, 12, 18] {
                let value = base + f64::from(d) + f64::from(h) / 100.0;
                rows.push(
                    Observation::new(at(d, h, 0), vec![Some(value), Some(25.0)])
                        .with_station(station),
                );
            }
        }
    }
    ObservationTable::with_rows(vec!["EC[g/l]".to_string(), "Temp".to_string()], rows)
}

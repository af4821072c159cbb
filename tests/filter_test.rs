//! Tests for the station/date window filter.
//!
//! Run with: cargo test --test filter_test

mod common;

use chrono::{DateTime, FixedOffset};

use baswap_api::pipeline::{filter, FilterRequest};
use baswap_api::table::{Observation, ObservationTable, Timestamp};
use common::{at, day, series, two_station_table};

fn times(table: &ObservationTable) -> Vec<chrono::NaiveDateTime> {
    table.normalized_rows().map(|(t, _)| t).collect()
}

#[test]
fn missing_date_bound_yields_empty_table_with_schema() {
    let table = two_station_table();

    for (from, to) in [(None, Some(day(3))), (Some(day(1)), None), (None, None)] {
        let out = filter(&table, Some("VGU"), from, to);
        assert!(out.is_empty());
        assert_eq!(out.columns(), table.columns());
    }
}

#[test]
fn date_window_is_inclusive_on_both_ends() {
    let table = two_station_table();
    let out = filter(&table, Some("Vĩnh Long"), Some(day(1)), Some(day(2)));

    assert_eq!(out.len(), 8);
    assert_eq!(times(&out).first(), Some(&at(1, 0, 0)));
    assert_eq!(times(&out).last(), Some(&at(2, 18, 0)));
}

#[test]
fn reversed_dates_are_swapped() {
    let table = two_station_table();
    let forward = filter(&table, Some("VGU"), Some(day(1)), Some(day(3)));
    let reversed = filter(&table, Some("VGU"), Some(day(3)), Some(day(1)));

    assert_eq!(forward, reversed);
    assert_eq!(forward.len(), 8);
}

#[test]
fn only_matching_station_is_kept() {
    let table = two_station_table();
    let out = filter(&table, Some("VGU"), Some(day(1)), Some(day(3)));

    assert!(out.rows().iter().all(|r| r.station.as_deref() == Some("VGU")));
    // Station match is exact, not normalized.
    assert!(filter(&table, Some("vgu"), Some(day(1)), Some(day(3))).is_empty());
}

#[test]
fn station_is_ignored_when_table_has_no_station_ids() {
    let table = series(&[(at(1, 8, 0), Some(1.0)), (at(1, 9, 0), Some(2.0))]);
    let out = filter(&table, Some("VGU"), Some(day(1)), Some(day(1)));
    assert_eq!(out.len(), 2);
}

#[test]
fn output_is_sorted_and_stable() {
    let table = ObservationTable::with_rows(
        vec!["v".to_string()],
        vec![
            Observation::new(at(1, 12, 0), vec![Some(3.0)]),
            Observation::new(at(1, 8, 0), vec![Some(1.0)]),
            Observation::new(at(1, 12, 0), vec![Some(4.0)]),
            Observation::new(at(1, 9, 0), vec![Some(2.0)]),
        ],
    );

    let out = filter(&table, None, Some(day(1)), Some(day(1)));
    let values: Vec<_> = out.rows().iter().map(|r| r.value(0)).collect();
    assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn unparseable_timestamps_are_dropped() {
    let table = ObservationTable::with_rows(
        vec!["v".to_string()],
        vec![
            Observation::new("2024-05-01 08:00:00", vec![Some(1.0)]),
            Observation::new("not a time", vec![Some(2.0)]),
            Observation::new(Timestamp::Missing, vec![Some(3.0)]),
        ],
    );

    let out = filter(&table, None, Some(day(1)), Some(day(1)));
    assert_eq!(out.len(), 1);
    assert_eq!(out.rows()[0].timestamp, Timestamp::Local(at(1, 8, 0)));
}

#[test]
fn aware_timestamps_are_converted_to_local_time() {
    // 2024-05-01 20:00 UTC is 2024-05-02 03:00 at UTC+7.
    let utc: DateTime<FixedOffset> = DateTime::parse_from_rfc3339("2024-05-01T20:00:00Z").unwrap();
    let table = ObservationTable::with_rows(
        vec!["v".to_string()],
        vec![Observation::new(utc, vec![Some(1.0)])],
    );

    assert!(filter(&table, None, Some(day(1)), Some(day(1))).is_empty());

    let out = filter(&table, None, Some(day(2)), Some(day(2)));
    assert_eq!(times(&out), vec![at(2, 3, 0)]);
}

#[test]
fn filter_request_applies_same_window() {
    let table = two_station_table();
    let request = FilterRequest {
        station: Some("VGU".to_string()),
        date_from: Some(day(3)),
        date_to: Some(day(3)),
    };

    assert_eq!(
        request.apply(&table),
        filter(&table, Some("VGU"), Some(day(3)), Some(day(3)))
    );
    assert_eq!(request.apply(&table).len(), 4);
}

#[test]
fn empty_table_filters_to_empty_table_with_schema() {
    let table = ObservationTable::new(vec!["EC[g/l]".to_string(), "Temp".to_string()]);
    let out = filter(&table, Some("VGU"), Some(day(1)), Some(day(3)));

    assert!(out.is_empty());
    assert_eq!(out.columns(), ["EC[g/l]", "Temp"]);
}

//! Tests for bucket aggregation.
//!
//! Run with: cargo test --test aggregate_test

mod common;

use baswap_api::pipeline::{
    aggregate, aggregate_labeled, AggregationRequest, BucketWidth, PipelineError, SummaryKind,
};
use baswap_api::table::{Observation, ObservationTable, Timestamp};
use common::{at, series};

const EC: &str = "EC[g/l]";

/// `(summary, time, target value)` per output row.
fn summarize(table: &ObservationTable) -> Vec<(Option<SummaryKind>, chrono::NaiveDateTime, Option<f64>)> {
    table
        .normalized_rows()
        .map(|(t, r)| (r.summary, t, r.value(0)))
        .collect()
}

fn scenario() -> ObservationTable {
    series(&[
        (at(1, 8, 0), Some(10.0)),
        (at(1, 9, 30), Some(30.0)),
        (at(1, 13, 0), Some(5.0)),
    ])
}

#[test]
fn hourly_min_max_keep_real_timestamps() {
    let request = AggregationRequest::new(
        EC,
        BucketWidth::Hour,
        [SummaryKind::Max, SummaryKind::Min],
    );
    let out = aggregate(&scenario(), &request).unwrap();

    let max = Some(SummaryKind::Max);
    let min = Some(SummaryKind::Min);
    assert_eq!(
        summarize(&out),
        vec![
            (max, at(1, 8, 0), Some(10.0)),
            (max, at(1, 9, 30), Some(30.0)),
            (max, at(1, 13, 0), Some(5.0)),
            (min, at(1, 8, 0), Some(10.0)),
            (min, at(1, 9, 30), Some(30.0)),
            (min, at(1, 13, 0), Some(5.0)),
        ]
    );
    assert_eq!(out.columns(), [EC.to_string()]);
}

#[test]
fn none_width_is_identity_even_with_bad_labels() {
    let table = scenario();
    let out = aggregate_labeled(&table, "missing column", "None", &["Mean", "Bogus"]).unwrap();
    assert_eq!(out, table);

    let request = AggregationRequest::new(EC, BucketWidth::None, [SummaryKind::Median]);
    assert_eq!(aggregate(&table, &request).unwrap(), table);
}

#[test]
fn median_is_stamped_at_bucket_start() {
    let table = series(&[
        (at(1, 10, 5), Some(4.0)),
        (at(1, 10, 20), Some(1.0)),
        (at(1, 10, 40), Some(3.0)),
        (at(1, 10, 55), Some(2.0)),
        (at(1, 11, 10), Some(7.0)),
        (at(1, 11, 30), None),
        (at(1, 11, 50), Some(9.0)),
        (at(1, 11, 59), Some(8.0)),
    ]);
    let request = AggregationRequest::new(EC, BucketWidth::Hour, [SummaryKind::Median]);
    let out = aggregate(&table, &request).unwrap();

    let median = Some(SummaryKind::Median);
    assert_eq!(
        summarize(&out),
        vec![
            (median, at(1, 10, 0), Some(2.5)),
            (median, at(1, 11, 0), Some(8.0)),
        ]
    );
}

#[test]
fn extremum_ties_resolve_to_first_row_in_table_order() {
    // Table order differs from time order on purpose.
    let table = series(&[
        (at(1, 8, 40), Some(5.0)),
        (at(1, 8, 10), Some(5.0)),
        (at(1, 8, 20), Some(1.0)),
    ]);
    let request = AggregationRequest::new(EC, BucketWidth::Hour, [SummaryKind::Max]);
    let out = aggregate(&table, &request).unwrap();

    assert_eq!(
        summarize(&out),
        vec![(Some(SummaryKind::Max), at(1, 8, 40), Some(5.0))]
    );
}

#[test]
fn day_buckets_are_anchored_at_midnight() {
    let table = series(&[
        (at(1, 0, 0), Some(2.0)),
        (at(1, 23, 59), Some(6.0)),
        (at(2, 0, 0), Some(1.0)),
        (at(2, 12, 0), Some(3.0)),
    ]);
    let request = AggregationRequest::new(EC, BucketWidth::Day, [SummaryKind::Median]);
    let out = aggregate(&table, &request).unwrap();

    let median = Some(SummaryKind::Median);
    assert_eq!(
        summarize(&out),
        vec![(median, at(1, 0, 0), Some(4.0)), (median, at(2, 0, 0), Some(2.0))]
    );
}

#[test]
fn buckets_without_values_emit_no_rows() {
    let table = series(&[
        (at(1, 8, 0), None),
        (at(1, 8, 30), Some(f64::NAN)),
        (at(1, 9, 0), Some(1.0)),
    ]);
    let request = AggregationRequest::new(
        EC,
        BucketWidth::Hour,
        [SummaryKind::Min, SummaryKind::Max, SummaryKind::Median],
    );
    let out = aggregate(&table, &request).unwrap();

    assert_eq!(out.len(), 3);
    assert!(out.rows().iter().all(|r| r.timestamp.normalize().unwrap() >= at(1, 9, 0)));
}

#[test]
fn empty_input_yields_empty_output() {
    let table = series(&[]);
    let request = AggregationRequest::new(EC, BucketWidth::Hour, [SummaryKind::Max]);
    let out = aggregate(&table, &request).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.columns(), [EC.to_string()]);
}

#[test]
fn zero_summary_kinds_returns_sorted_untagged_rows() {
    let table = ObservationTable::with_rows(
        vec![EC.to_string()],
        vec![
            Observation::new(at(1, 9, 0), vec![Some(2.0)]),
            Observation::new("garbage", vec![Some(9.0)]),
            Observation::new(at(1, 8, 0), vec![Some(1.0)]),
        ],
    );
    let request = AggregationRequest::new(EC, BucketWidth::Hour, []);
    let out = aggregate(&table, &request).unwrap();

    assert_eq!(
        summarize(&out),
        vec![(None, at(1, 8, 0), Some(1.0)), (None, at(1, 9, 0), Some(2.0))]
    );
}

#[test]
fn invalid_requests_are_rejected_with_input_as_fallback() {
    let table = scenario();

    let rejected = aggregate_labeled(&table, EC, "Week", &["Max"]).unwrap_err();
    assert_eq!(rejected.error, PipelineError::UnknownBucketWidth("Week".to_string()));
    assert_eq!(rejected.fallback, table);

    let rejected = aggregate_labeled(&table, EC, "Hour", &["Max", "Mean"]).unwrap_err();
    assert_eq!(rejected.error, PipelineError::UnknownSummaryKind("Mean".to_string()));
    assert_eq!(rejected.fallback, table);

    let rejected = aggregate_labeled(&table, "Temp", "Day", &["Max"]).unwrap_err();
    assert_eq!(rejected.error, PipelineError::UnknownColumn("Temp".to_string()));
    assert_eq!(rejected.fallback, table);
}

#[test]
fn labels_are_case_sensitive() {
    assert!("hour".parse::<BucketWidth>().is_err());
    assert!("max".parse::<SummaryKind>().is_err());
    assert_eq!("Hour".parse::<BucketWidth>(), Ok(BucketWidth::Hour));
    assert_eq!("Median".parse::<SummaryKind>(), Ok(SummaryKind::Median));
}

#[test]
fn duplicate_summary_kinds_are_collapsed() {
    let request = AggregationRequest::parse(EC, "Hour", &["Max", "Min", "Max"]).unwrap();
    assert_eq!(request.summaries(), [SummaryKind::Max, SummaryKind::Min]);

    let out = aggregate(&scenario(), &request).unwrap();
    assert_eq!(out.len(), 6);
}

#[test]
fn forecast_columns_carry_last_value_per_bucket() {
    let table = ObservationTable::with_rows(
        vec![EC.to_string(), "Temp".to_string(), "Predicted_EC".to_string()],
        vec![
            Observation::new(at(1, 8, 50), vec![Some(2.0), Some(25.0), None]),
            Observation::new(at(1, 8, 10), vec![Some(4.0), Some(26.0), Some(0.5)]),
            Observation::new(at(1, 8, 30), vec![Some(3.0), Some(27.0), Some(0.7)]),
            Observation::new(at(1, 9, 15), vec![Some(1.0), Some(28.0), None]),
        ],
    );
    let request = AggregationRequest::new(EC, BucketWidth::Hour, [SummaryKind::Min]);
    let out = aggregate(&table, &request).unwrap();

    assert_eq!(out.columns(), [EC.to_string(), "Predicted_EC".to_string()]);

    let rows: Vec<_> = out.rows().iter().map(|r| r.values.clone()).collect();
    assert_eq!(
        rows,
        vec![vec![Some(2.0), Some(0.7)], vec![Some(1.0), None]]
    );
    assert_eq!(out.rows()[0].timestamp, Timestamp::Local(at(1, 8, 50)));
}

#[test]
fn aggregation_is_deterministic() {
    let request = AggregationRequest::new(
        EC,
        BucketWidth::Hour,
        [SummaryKind::Median, SummaryKind::Max],
    );
    let table = scenario();
    assert_eq!(
        aggregate(&table, &request).unwrap(),
        aggregate(&table, &request).unwrap()
    );
}

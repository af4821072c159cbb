//! Tests for CSV loading.
//!
//! Run with: cargo test --test loader_test

mod common;

use baswap_api::pipeline::latest_reading;
use baswap_api::table::{
    read_csv, read_stations_csv, ColumnHints, ColumnRole, LoadError, ObservationTable,
};
use common::at;

const BUOY_CSV: &str = "\
Timestamp (GMT+7),EC[g/l],Temp
2024-05-01 08:00:00,0.42,28.1
2024-05-01 09:00:00,,28.3
2024-05-01 10:00:00,NaN,n/a
,0.50,28.0
";

const STATIONS_CSV: &str = "\
station_name,measdate,EC[g/l]
Trà Vinh,2024-05-01 07:00:00,1.5
Bến Trại,2024-05-01 07:00:00,3.25
";

#[test]
fn buoy_export_uses_default_station() {
    let table = read_csv(BUOY_CSV.as_bytes(), "Vĩnh Long").unwrap();

    assert_eq!(table.columns(), ["EC[g/l]", "Temp"]);
    assert_eq!(table.len(), 4);
    assert_eq!(table.stations(), ["Vĩnh Long"]);

    let first = &table.rows()[0];
    assert_eq!(first.timestamp.normalize(), Some(at(1, 8, 0)));
    assert_eq!(first.values, vec![Some(0.42), Some(28.1)]);
}

#[test]
fn empty_and_non_numeric_cells_are_missing() {
    let table = read_csv(BUOY_CSV.as_bytes(), "Vĩnh Long").unwrap();

    assert_eq!(table.rows()[1].values, vec![None, Some(28.3)]);
    assert_eq!(table.rows()[2].values, vec![None, None]);
    // The timestamp is kept raw; it is only dropped downstream.
    assert_eq!(table.rows()[3].timestamp.normalize(), None);
}

#[test]
fn station_column_overrides_default() {
    let table = read_csv(STATIONS_CSV.as_bytes(), "Vĩnh Long").unwrap();
    assert_eq!(table.columns(), ["EC[g/l]"]);
    assert_eq!(table.stations(), ["Trà Vinh", "Bến Trại"]);
}

#[test]
fn missing_time_column_is_an_error() {
    let err = read_csv("station,EC[g/l]\nVGU,1.0\n".as_bytes(), "VGU").unwrap_err();
    assert!(matches!(err, LoadError::MissingTimeColumn(ref cols) if cols.len() == 2));
}

#[test]
fn stations_file_requires_all_roles() {
    let table = read_stations_csv(STATIONS_CSV.as_bytes(), None).unwrap();
    assert_eq!(table.len(), 2);

    let err = read_stations_csv(BUOY_CSV.as_bytes(), None).unwrap_err();
    assert!(matches!(err, LoadError::Columns(ref e) if e.role == ColumnRole::Station));
}

#[test]
fn merge_widens_schema() {
    let mut buoy = read_csv(BUOY_CSV.as_bytes(), "Vĩnh Long").unwrap();
    let partner = ObservationTable::with_rows(
        vec!["Level".to_string(), "EC[g/l]".to_string()],
        read_stations_csv(STATIONS_CSV.as_bytes(), None)
            .unwrap()
            .rows()
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row.values.insert(0, Some(1.0));
                row
            })
            .collect(),
    );

    buoy.merge(partner);

    assert_eq!(buoy.columns(), ["EC[g/l]", "Temp", "Level"]);
    assert_eq!(buoy.len(), 6);
    assert_eq!(buoy.rows()[0].values, vec![Some(0.42), Some(28.1), None]);
    assert_eq!(buoy.rows()[4].values, vec![Some(1.5), None, Some(1.0)]);
    assert_eq!(buoy.stations(), ["Vĩnh Long", "Trà Vinh", "Bến Trại"]);
}

#[test]
fn select_reorders_and_drops_unknown() {
    let table = read_csv(BUOY_CSV.as_bytes(), "Vĩnh Long").unwrap();
    let picked = table.select(&["Temp", "nope", "EC[g/l]"]);

    assert_eq!(picked.columns(), ["Temp", "EC[g/l]"]);
    assert_eq!(picked.rows()[0].values, vec![Some(28.1), Some(0.42)]);
}

#[test]
fn partner_ec_column_is_aligned_with_buoy_ec_before_merge() {
    let buoy_csv = "\
Timestamp (GMT+7),EC Value (g/l),Temp
2024-05-01 08:00:00,0.4,28.1
";
    let mut buoy = read_csv(buoy_csv.as_bytes(), "Vĩnh Long").unwrap();
    let ec = ColumnHints::default().value_column(buoy.columns());
    assert_eq!(ec.as_deref(), Some("EC Value (g/l)"));

    let partner = read_stations_csv(STATIONS_CSV.as_bytes(), ec.as_deref()).unwrap();
    assert_eq!(partner.columns(), ["EC Value (g/l)"]);

    buoy.merge(partner);
    assert_eq!(buoy.columns(), ["EC Value (g/l)", "Temp"]);
    assert_eq!(
        latest_reading(&buoy, "Vĩnh Long", "EC Value (g/l)"),
        Some((at(1, 8, 0), 0.4))
    );
    assert_eq!(
        latest_reading(&buoy, "Trà Vinh", "EC Value (g/l)"),
        Some((at(1, 7, 0), 1.5))
    );
}

#[test]
fn rename_column_never_clobbers_an_existing_column() {
    let mut table = read_csv(BUOY_CSV.as_bytes(), "Vĩnh Long").unwrap();
    assert!(!table.rename_column("EC[g/l]", "Temp"));
    assert!(!table.rename_column("Level", "Depth"));
    assert!(table.rename_column("Temp", "Temperature"));
    assert_eq!(table.columns(), ["EC[g/l]", "Temperature"]);
}

//! CSV loading for the canonical observation table.

use std::io::Read;
use std::path::Path;

use super::{resolve_columns, ColumnHints, ColumnResolutionError, Observation, ObservationTable, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no timestamp column found among [{}]", .0.join(", "))]
    MissingTimeColumn(Vec<String>),

    #[error(transparent)]
    Columns(#[from] ColumnResolutionError),
}

/// Load a CSV file. See [`read_csv`].
///
/// # Errors
///
/// Returns `LoadError` if the file cannot be read, is not valid CSV, or
/// has no recognizable timestamp column.
pub fn load_csv(path: impl AsRef<Path>, default_station: &str) -> Result<ObservationTable, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = read_csv(file, default_station)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Dataset loaded"
    );
    Ok(table)
}

/// Read observations from CSV.
///
/// The timestamp column and the optional station column are found with
/// the default [`ColumnHints`]; all remaining columns are measurements.
/// Rows without a station column are attributed to `default_station`.
/// Timestamps are kept raw and normalized later by the pipeline. Empty or
/// non-numeric cells, and NaN, become missing values.
///
/// # Errors
///
/// Returns `LoadError` on malformed CSV or when no timestamp column exists.
pub fn read_csv<R: Read>(reader: R, default_station: &str) -> Result<ObservationTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let hints = ColumnHints::default();

    let time_col = hints
        .time_column(&headers)
        .ok_or_else(|| LoadError::MissingTimeColumn(headers.clone()))?;
    let station_col = hints.station_column(&headers);

    let time_idx = headers.iter().position(|h| *h == time_col);
    let station_idx = station_col
        .as_ref()
        .and_then(|s| headers.iter().position(|h| h == s));

    let value_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| Some(i) != time_idx && Some(i) != station_idx)
        .collect();
    let columns = value_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut table = ObservationTable::new(columns);
    for record in rdr.records() {
        let record = record?;

        let timestamp = time_idx
            .and_then(|i| record.get(i))
            .map_or(Timestamp::Missing, Timestamp::from);
        let station = station_idx
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .unwrap_or(default_station);
        let values = value_idx
            .iter()
            .map(|&i| {
                record
                    .get(i)
                    .and_then(|cell| cell.parse::<f64>().ok())
                    .filter(|v| !v.is_nan())
            })
            .collect();

        let row = Observation::new(timestamp, values);
        table.push(if station.is_empty() { row } else { row.with_station(station) });
    }

    Ok(table)
}

/// Load a multi-station CSV file. See [`read_stations_csv`].
///
/// # Errors
///
/// Returns `LoadError` if the file cannot be read or parsed, or lacks a
/// station, time or EC value column.
pub fn load_stations_csv(
    path: impl AsRef<Path>,
    ec_column: Option<&str>,
) -> Result<ObservationTable, LoadError> {
    let path = path.as_ref();
    let table = read_stations_csv(std::fs::File::open(path)?, ec_column)?;
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        stations = table.stations().len(),
        "Stations file loaded"
    );
    Ok(table)
}

/// Read a partner-network export holding several stations.
///
/// Unlike [`read_csv`] the station, time and EC value columns are all
/// required, found with [`resolve_columns`]. When `ec_column` is given the
/// EC value column is renamed to it, so the readings line up with the
/// primary dataset's EC series after a merge.
///
/// # Errors
///
/// Returns `LoadError::Columns` naming the first role with no matching
/// column, or any CSV error.
pub fn read_stations_csv<R: Read>(
    mut reader: R,
    ec_column: Option<&str>,
) -> Result<ObservationTable, LoadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let headers: Vec<String> = csv::Reader::from_reader(text.as_bytes())
        .headers()?
        .iter()
        .map(str::to_string)
        .collect();
    let resolved = resolve_columns(&headers)?;
    tracing::debug!(
        station = %resolved.station,
        time = %resolved.time,
        value = %resolved.value,
        "stations file columns resolved"
    );

    let mut table = read_csv(text.as_bytes(), "")?;
    if let Some(target) = ec_column
        && table.rename_column(&resolved.value, target)
    {
        tracing::debug!(from = %resolved.value, to = %target, "EC column aligned");
    }
    Ok(table)
}

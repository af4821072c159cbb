//! In-memory observation tables.
//!
//! A table is a schema (the measurement column names) plus rows. Each row
//! holds a timestamp, an optional station id, one nullable value per
//! measurement column and, for aggregated output, the summary kind that
//! produced it.

pub mod columns;
pub mod loader;
pub mod timestamp;

use chrono::NaiveDateTime;

pub use columns::{
    resolve_columns, ColumnHints, ColumnResolutionError, ColumnRole, ResolvedColumns,
};
pub use loader::{load_csv, load_stations_csv, read_csv, read_stations_csv, LoadError};
pub use timestamp::{normalize_timestamp, Timestamp, LOCAL_OFFSET};

use crate::pipeline::SummaryKind;

/// One sensor reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: Timestamp,
    pub station: Option<String>,
    /// One entry per table column, `None` for missing readings.
    pub values: Vec<Option<f64>>,
    /// Set on rows produced by the bucket aggregator.
    pub summary: Option<SummaryKind>,
}

impl Observation {
    #[must_use]
    pub fn new(timestamp: impl Into<Timestamp>, values: Vec<Option<f64>>) -> Self {
        Self {
            timestamp: timestamp.into(),
            station: None,
            values,
            summary: None,
        }
    }

    #[must_use]
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    /// Value of column `index`, treating NaN as missing.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten().filter(|v| !v.is_nan())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Observation>,
}

impl ObservationTable {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, padding or truncating each row's values to
    /// the schema width.
    #[must_use]
    pub fn with_rows(columns: Vec<String>, rows: Vec<Observation>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push(row);
        }
        table
    }

    /// An empty table with the same schema.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self::new(self.columns.clone())
    }

    pub fn push(&mut self, mut row: Observation) {
        row.values.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether any row carries a station id.
    #[must_use]
    pub fn has_stations(&self) -> bool {
        self.rows.iter().any(|r| r.station.is_some())
    }

    /// Distinct station ids in first-seen order.
    #[must_use]
    pub fn stations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for station in self.rows.iter().filter_map(|r| r.station.as_deref()) {
            if !seen.contains(&station) {
                seen.push(station);
            }
        }
        seen
    }

    /// Rows with a parseable timestamp, paired with the normalized value,
    /// in table order.
    pub fn normalized_rows(&self) -> impl Iterator<Item = (NaiveDateTime, &Observation)> {
        self.rows
            .iter()
            .filter_map(|r| r.timestamp.normalize().map(|t| (t, r)))
    }

    /// Keep only the named columns, in the requested order. Unknown names
    /// are ignored.
    #[must_use]
    pub fn select(&self, names: &[&str]) -> Self {
        let picked: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n))
            .collect();
        let columns = picked.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|r| Observation {
                values: picked.iter().map(|&i| r.values.get(i).copied().flatten()).collect(),
                ..r.clone()
            })
            .collect();
        Self { columns, rows }
    }

    /// Rename column `from` to `to`. Does nothing if `from` is absent or
    /// `to` is already taken by another column.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to || self.column_index(to).is_some() {
            return false;
        }
        let Some(idx) = self.column_index(from) else {
            return false;
        };
        self.columns[idx] = to.to_string();
        true
    }

    /// Append another table's rows, widening the schema to the union of
    /// both column sets.
    pub fn merge(&mut self, other: Self) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|c| {
                self.column_index(c).unwrap_or_else(|| {
                    self.columns.push(c.clone());
                    self.columns.len() - 1
                })
            })
            .collect();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.values.resize(width, None);
        }

        for row in other.rows {
            let mut values = vec![None; width];
            for (src, &dst) in mapping.iter().enumerate() {
                values[dst] = row.values.get(src).copied().flatten();
            }
            self.rows.push(Observation { values, ..row });
        }
    }
}

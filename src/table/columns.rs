//! Column resolution for inconsistently named schemas.
//!
//! Telemetry exports and station spreadsheets name the same concepts
//! differently (`station_name` vs `Station`, `measdate` vs
//! `Timestamp (GMT+7)`, `EC[g/l]` vs `EC Value (g/l)`). Names are compared
//! after lowercasing and removing everything that is not a letter or digit.

/// Normalize a column name for comparison: lowercase alphanumerics only.
#[must_use]
pub fn norm_col(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Which role a column plays in a station table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Station,
    Time,
    Value,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Station => write!(f, "station"),
            Self::Time => write!(f, "time"),
            Self::Value => write!(f, "value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no {role} column found among [{}]", .available.join(", "))]
pub struct ColumnResolutionError {
    pub role: ColumnRole,
    pub available: Vec<String>,
}

/// Columns picked out of a schema, by their original names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub station: String,
    pub time: String,
    pub value: String,
}

/// Candidate names per role, already normalized with [`norm_col`].
#[derive(Debug, Clone)]
pub struct ColumnHints {
    pub station: Vec<String>,
    pub time: Vec<String>,
    /// Normalized prefixes that also identify a time column.
    pub time_prefixes: Vec<String>,
    pub value: Vec<String>,
}

impl Default for ColumnHints {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| norm_col(n)).collect();
        Self {
            station: owned(&["station_name", "station", "station_id", "name"]),
            time: owned(&["measdate", "datetime", "timestamp", "time", "date", "ds"]),
            time_prefixes: owned(&["timestamp"]),
            value: owned(&["ecgl", "ecvaluegl", "ecgperl", "ecglvalue", "ecg"]),
        }
    }
}

impl ColumnHints {
    /// The first schema column matching a station candidate.
    pub fn station_column<S: AsRef<str>>(&self, schema: &[S]) -> Option<String> {
        pick(schema, &self.station, &[])
    }

    /// The first schema column matching a time candidate or prefix.
    pub fn time_column<S: AsRef<str>>(&self, schema: &[S]) -> Option<String> {
        pick(schema, &self.time, &self.time_prefixes)
    }

    /// The first schema column matching a value candidate.
    pub fn value_column<S: AsRef<str>>(&self, schema: &[S]) -> Option<String> {
        pick(schema, &self.value, &[])
    }

    /// Resolve all three roles or report the first one missing.
    ///
    /// # Errors
    ///
    /// Returns `ColumnResolutionError` naming the role no column matched.
    pub fn resolve<S: AsRef<str>>(
        &self,
        schema: &[S],
    ) -> Result<ResolvedColumns, ColumnResolutionError> {
        let missing = |role| ColumnResolutionError {
            role,
            available: schema.iter().map(|c| c.as_ref().to_string()).collect(),
        };

        Ok(ResolvedColumns {
            station: self
                .station_column(schema)
                .ok_or_else(|| missing(ColumnRole::Station))?,
            time: self
                .time_column(schema)
                .ok_or_else(|| missing(ColumnRole::Time))?,
            value: self
                .value_column(schema)
                .ok_or_else(|| missing(ColumnRole::Value))?,
        })
    }
}

/// Resolve station, time and value columns with the default hints.
///
/// # Errors
///
/// Returns `ColumnResolutionError` if any role has no matching column.
pub fn resolve_columns<S: AsRef<str>>(
    schema: &[S],
) -> Result<ResolvedColumns, ColumnResolutionError> {
    ColumnHints::default().resolve(schema)
}

// Candidates are tried in priority order; exact matches win over prefixes.
fn pick<S: AsRef<str>>(schema: &[S], exact: &[String], prefixes: &[String]) -> Option<String> {
    let normalized: Vec<(String, &str)> = schema
        .iter()
        .map(|c| (norm_col(c.as_ref()), c.as_ref()))
        .collect();

    exact
        .iter()
        .find_map(|cand| normalized.iter().find(|(n, _)| n == cand))
        .or_else(|| {
            prefixes
                .iter()
                .find_map(|p| normalized.iter().find(|(n, _)| n.starts_with(p.as_str())))
        })
        .map(|(_, original)| (*original).to_string())
}

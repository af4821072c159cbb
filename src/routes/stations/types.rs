use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::pipeline::Statistics;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LatestReading {
    pub time: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationResponse {
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Operated by the buoy project
    pub buoy: bool,
    /// Whether the loaded dataset has readings for this station
    pub has_data: bool,
    /// Most recent non-null reading of the requested column
    pub latest: Option<LatestReading>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationsQuery {
    /// Column for the latest reading (default: first dataset column)
    pub column: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StationStatisticsQuery {
    /// First calendar day (inclusive, YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last calendar day (inclusive, YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Measurement column (default: first dataset column)
    pub column: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsResponse {
    pub station: String,
    pub column: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub statistics: Statistics,
}

mod handlers;
mod types;

pub use handlers::{get_station_statistics, list_columns, list_stations};
pub use types::{LatestReading, StationResponse, StationStatisticsQuery, StationsQuery, StatisticsResponse};

// Re-export utoipa path structs for OpenAPI documentation
pub use handlers::{__path_get_station_statistics, __path_list_columns, __path_list_stations};

use std::env;

use chrono::TimeDelta;

use crate::pipeline::GapThresholds;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Dataset
    pub data_path: String,
    pub stations_data_path: Option<String>,
    pub default_station: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
    pub bulk_concurrent_limit: usize,

    // Charting
    pub gap_thresholds: GapThresholds,
    pub forecast_horizon: usize,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = GapThresholds::default();

        Ok(Self {
            // Dataset
            data_path: env::var("DATA_PATH").map_err(|_| ConfigError::Missing("DATA_PATH"))?,
            stations_data_path: env::var("STATIONS_DATA_PATH")
                .ok()
                .filter(|p| !p.is_empty()),
            default_station: env::var("DEFAULT_STATION")
                .unwrap_or_else(|_| "Vĩnh Long".to_string()),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            bulk_concurrent_limit: env::var("BULK_CONCURRENT_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Charting
            gap_thresholds: GapThresholds {
                raw: gap_threshold("GAP_RAW_MINUTES", TimeDelta::try_minutes)
                    .unwrap_or(defaults.raw),
                hour: gap_threshold("GAP_HOUR_HOURS", TimeDelta::try_hours)
                    .unwrap_or(defaults.hour),
                day: gap_threshold("GAP_DAY_DAYS", TimeDelta::try_days)
                    .unwrap_or(defaults.day),
            },
            forecast_horizon: env::var("FORECAST_HORIZON")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Parse a gap threshold given as a count of `unit`s.
///
/// Only positive counts that fit in a `TimeDelta` are accepted; anything
/// else yields `None` so the caller keeps its default.
#[must_use]
pub fn parse_gap_threshold(raw: &str, unit: fn(i64) -> Option<TimeDelta>) -> Option<TimeDelta> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|&n| n > 0)
        .and_then(unit)
}

fn gap_threshold(var: &'static str, unit: fn(i64) -> Option<TimeDelta>) -> Option<TimeDelta> {
    let raw = env::var(var).ok()?;
    let parsed = parse_gap_threshold(&raw, unit);
    if parsed.is_none() {
        tracing::warn!(var, value = %raw, "Ignoring invalid gap threshold, using default");
    }
    parsed
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

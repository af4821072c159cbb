//! Forecast overlay capability.
//!
//! The forecasting model itself lives outside this crate. The pipeline
//! only needs something that maps a history to point predictions and,
//! optionally, prediction intervals.

use serde::Serialize;
use utoipa::ToSchema;

use super::BucketWidth;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PredictionInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Point predictions with optional intervals, one entry per step ahead.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Forecast {
    pub median: Vec<f64>,
    pub intervals: Option<Vec<PredictionInterval>>,
}

pub trait Forecaster: Send + Sync {
    /// Predict `horizon` steps of width `freq` following `history`.
    fn predict(&self, history: &[f64], horizon: usize, freq: BucketWidth) -> Forecast;
}

/// Repeats the last observed value. Stands in when no trained model is
/// deployed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersistenceForecaster;

impl Forecaster for PersistenceForecaster {
    fn predict(&self, history: &[f64], horizon: usize, _freq: BucketWidth) -> Forecast {
        let median = history
            .last()
            .map(|&last| vec![last; horizon])
            .unwrap_or_default();
        Forecast {
            median,
            intervals: None,
        }
    }
}

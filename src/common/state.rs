use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::pipeline::{Forecaster, PersistenceForecaster};
use crate::table::ObservationTable;

/// Shared, read-only request context.
///
/// The dataset is loaded once at startup and never mutated; every handler
/// runs the pipeline fresh over it, so nothing can go stale between
/// requests.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<ObservationTable>,
    pub config: Arc<Config>,
    pub forecaster: Arc<dyn Forecaster>,
    /// Limits concurrent bulk (CSV/NDJSON) responses.
    pub bulk_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(dataset: ObservationTable, config: Config) -> Self {
        Self::with_forecaster(dataset, config, Arc::new(PersistenceForecaster))
    }

    pub fn with_forecaster(
        dataset: ObservationTable,
        config: Config,
        forecaster: Arc<dyn Forecaster>,
    ) -> Self {
        let bulk_permits = Arc::new(Semaphore::new(config.bulk_concurrent_limit));
        Self {
            dataset: Arc::new(dataset),
            config: Arc::new(config),
            forecaster,
            bulk_permits,
        }
    }
}

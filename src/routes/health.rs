use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Rows in the loaded dataset
    pub rows: usize,
    /// Distinct stations in the loaded dataset
    pub stations: usize,
}

/// Health check endpoint
///
/// Returns 200 OK with dataset size if the service is running.
/// This endpoint is not rate-limited and suitable for Kubernetes probes.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rows: state.dataset.len(),
        stations: state.dataset.stations().len(),
    })
}

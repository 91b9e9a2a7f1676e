//! Health check: GET /api/health

use axum::extract::State;
use serde::Serialize;

use super::{ApiResult, AppState, blocking, error::ok};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// GET /api/health - liveness plus a database round trip.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let repository = state.repository.clone();
    blocking(move || Ok(repository.ping()?)).await?;
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: "ok",
    })
}

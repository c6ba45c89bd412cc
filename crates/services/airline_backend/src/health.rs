// --- File: crates/services/airline_backend/src/health.rs ---
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use airline_db::DbClient;

pub struct HealthState {
    pub db: DbClient,
    pub service: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// `connected` when the database answers `SELECT 1`.
    pub database: &'static str,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up; database reachability reported separately", body = HealthResponse)
    ),
    tag = "Health"
))]
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    let database = if state.db.is_healthy().await {
        "connected"
    } else {
        "disconnected"
    };
    Json(HealthResponse {
        status: if database == "connected" { "healthy" } else { "degraded" },
        service: state.service,
        database,
    })
}

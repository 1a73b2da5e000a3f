//! Liveness, readiness and metrics probes.

use axum::routing::get;
use axum::{Json, Router};
use ovpo_core::{HealthStatus, ProbeStatus};

use crate::state::AppState;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "collector";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
}

/// GET /health: Liveness with service name and unix timestamp.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthStatus)),
    tag = "probes"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok(SERVICE_NAME))
}

/// GET /ready: Readiness. The schema store is built before the listener
/// binds, so a serving process is ready.
#[utoipa::path(
    get,
    path = "/ready",
    responses((status = 200, description = "Service is ready", body = ProbeStatus)),
    tag = "probes"
)]
pub async fn ready() -> Json<ProbeStatus> {
    Json(ProbeStatus::ok())
}

/// GET /metrics: Placeholder.
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Metrics not implemented", body = ProbeStatus)),
    tag = "probes"
)]
pub async fn metrics() -> Json<ProbeStatus> {
    Json(ProbeStatus::not_implemented())
}

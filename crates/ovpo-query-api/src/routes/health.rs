use axum::routing::get;
use axum::{Json, Router};
use ovpo_core::HealthStatus;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "query-api";

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthStatus)),
    tag = "probes"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok(SERVICE_NAME))
}

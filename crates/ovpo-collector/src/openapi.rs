//! # OpenAPI Document
//!
//! Collects the utoipa-annotated collector routes and serves the result
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OVPO Collector",
        description = "Ingest gate for batches of traces and events (schema v0.08)."
    ),
    paths(
        crate::routes::ingest::ingest_batch,
        crate::routes::probes::health,
        crate::routes::probes::ready,
        crate::routes::probes::metrics,
    ),
    components(schemas(
        crate::gate::BatchAck,
        crate::gate::ItemError,
        crate::error::ErrorBody,
        ovpo_core::HealthStatus,
        ovpo_core::ProbeStatus,
    )),
    tags(
        (name = "ingest", description = "Batch acceptance"),
        (name = "probes", description = "Health and readiness"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/v1/ingest/batch", "/health", "/ready", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

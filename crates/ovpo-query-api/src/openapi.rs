//! OpenAPI document for the query API, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "OVPO Query API",
        description = "Read access to ingested traces (schema v0.08)."
    ),
    paths(crate::routes::health::health, crate::routes::traces::get_trace),
    components(schemas(crate::routes::traces::TraceLookup, ovpo_core::HealthStatus)),
    tags(
        (name = "traces", description = "Trace lookup"),
        (name = "probes", description = "Health"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

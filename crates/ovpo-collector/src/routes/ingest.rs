//! # Batch Ingest
//!
//! `POST /v1/ingest/batch`. The handler takes the raw body so that no
//! extractor rejects the request before the gate's header stages run.

use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::Router;

use crate::gate::AcceptanceDecision;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/ingest/batch", post(ingest_batch))
}

/// POST /v1/ingest/batch: Validate and acknowledge a batch of traces and
/// events. The body is a JSON document conforming to `ingest_batch.json`.
#[utoipa::path(
    post,
    path = "/v1/ingest/batch",
    params(
        ("Authorization" = String, Header, description = "`Bearer ovpo_sk_<key>`"),
        ("Idempotency-Key" = String, Header, description = "Client-chosen key for safe retries"),
        ("X-OVPO-Schema-Version" = String, Header, description = "Must be `0.08`"),
        ("Content-Length" = u64, Header, description = "Declared body size, at most 5242880"),
    ),
    responses(
        (status = 202, description = "Batch accepted", body = crate::gate::BatchAck),
        (status = 400, description = "Missing header, unsupported version or unreadable body", body = crate::error::ErrorBody),
        (status = 401, description = "Malformed API key", body = crate::error::ErrorBody),
        (status = 411, description = "Content-Length missing", body = crate::error::ErrorBody),
        (status = 413, description = "Payload over 5MB", body = crate::error::ErrorBody),
        (status = 422, description = "Schema validation failed", body = crate::error::ErrorBody),
        (status = 500, description = "Ingest schema misconfigured", body = crate::error::ErrorBody),
        (status = 503, description = "Queue or idempotency store unavailable", body = crate::error::ErrorBody),
    ),
    tag = "ingest"
)]
#[tracing::instrument(name = "ingest_batch", skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn ingest_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> AcceptanceDecision {
    state.gate().evaluate(&headers, body).await
}

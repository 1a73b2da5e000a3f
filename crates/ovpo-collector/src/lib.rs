//! # ovpo-collector
//!
//! Collector service for OVPO batches. `POST /v1/ingest/batch` runs every
//! submission through the [`gate::AcceptanceGate`]; a batch is either
//! rejected with a single `{"detail"}` error or acknowledged with `202`.
//!
//! ## Modules
//!
//! - [`gate`]: staged header, key, version, size and schema checks.
//! - [`error`]: rejection kinds and their HTTP mapping.
//! - [`ports`]: optional queue and idempotency collaborators.
//! - [`state`]: configuration and shared handler state.
//! - [`routes`]: ingest and probe handlers.
//! - [`openapi`]: `/openapi.json`.

pub mod error;
pub mod gate;
pub mod openapi;
pub mod ports;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the collector router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::ingest::router())
        .merge(routes::probes::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

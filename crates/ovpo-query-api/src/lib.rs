//! # ovpo-query-api
//!
//! Read-side service for OVPO traces. Lookups are answered without a
//! backing store for now.

pub mod config;
pub mod openapi;
pub mod routes;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the query API router.
pub fn app() -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::traces::router())
        .merge(openapi::router())
        .layer(TraceLayer::new_for_http())
}

//! # Trace Lookup
//!
//! `GET /v0.08/traces/{trace_id}`. No trace store is wired in, so every
//! lookup answers `found: false` with an explanatory note. The identifier
//! is echoed verbatim and not validated.

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Note attached to every lookup until storage exists.
pub const STORAGE_NOTE: &str = "storage not wired yet";

/// Result of a trace lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TraceLookup {
    pub trace_id: String,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TraceLookup {
    pub fn not_found(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            found: false,
            note: Some(STORAGE_NOTE.to_string()),
        }
    }
}

pub fn router() -> Router {
    Router::new().route("/v0.08/traces/{trace_id}", get(get_trace))
}

/// GET /v0.08/traces/{trace_id}
#[utoipa::path(
    get,
    path = "/v0.08/traces/{trace_id}",
    params(("trace_id" = String, Path, description = "Trace identifier, echoed as given")),
    responses((status = 200, description = "Lookup result", body = TraceLookup)),
    tag = "traces"
)]
pub async fn get_trace(Path(trace_id): Path<String>) -> Json<TraceLookup> {
    tracing::debug!(%trace_id, "trace lookup without storage");
    Json(TraceLookup::not_found(trace_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_note() {
        let lookup = TraceLookup::not_found("abc");
        assert_eq!(lookup.trace_id, "abc");
        assert!(!lookup.found);
        assert_eq!(lookup.note.as_deref(), Some("storage not wired yet"));
    }

    #[test]
    fn note_omitted_when_absent() {
        let lookup = TraceLookup {
            trace_id: "t".into(),
            found: true,
            note: None,
        };
        let json = serde_json::to_value(&lookup).unwrap();
        assert!(json.get("note").is_none());
    }
}

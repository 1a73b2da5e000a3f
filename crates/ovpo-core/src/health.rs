//! # Probe Response Bodies
//!
//! Shared JSON bodies for `/health`, `/ready` and `/metrics`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness body: `{status, service, ts}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Name of the reporting service (`collector`, `query-api`).
    pub service: String,
    /// Server time, unix seconds.
    pub ts: i64,
}

impl HealthStatus {
    /// Healthy status for `service`, stamped with the current time.
    pub fn ok(service: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            ts: Utc::now().timestamp(),
        }
    }
}

/// Single-field probe body: `{status}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProbeStatus {
    pub status: String,
}

impl ProbeStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Marks an endpoint that deliberately does nothing yet.
    pub fn not_implemented() -> Self {
        Self {
            status: "not_implemented".to_string(),
        }
    }
}

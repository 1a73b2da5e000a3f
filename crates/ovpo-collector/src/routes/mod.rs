//! # Collector Route Modules
//!
//! - `ingest`: `POST /v1/ingest/batch`, the acceptance gate.
//! - `probes`: `/health`, `/ready` and `/metrics`.

pub mod ingest;
pub mod probes;

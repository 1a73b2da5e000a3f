//! # ovpo-core: Shared Foundations
//!
//! Leaf crate of the OVPO workspace. Every service and tool depends on it;
//! it depends on no other `ovpo-*` crate.
//!
//! ## Contents
//!
//! - Schema version constants. The wire-level version (`0.08`) and the
//!   on-disk schema directory name (`v0.08`) are defined side by side so
//!   they cannot drift apart.
//! - [`config`]: environment-variable parsing shared by the binaries.
//! - [`telemetry`]: `tracing-subscriber` initialization.
//! - [`health`]: response bodies for liveness/readiness/metrics probes.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod config;
pub mod health;
pub mod telemetry;

pub use config::{ConfigError, LogFormat};
pub use health::{HealthStatus, ProbeStatus};

/// Schema version accepted by the ingest API (`X-OVPO-Schema-Version`).
pub const SCHEMA_VERSION: &str = "0.08";

/// Directory (under the schemas root) holding the documents for
/// [`SCHEMA_VERSION`].
pub const SCHEMA_DIR_NAME: &str = "v0.08";

/// Workspace release version, reported by `ovpo version`.
pub const OVPO_VERSION: &str = env!("CARGO_PKG_VERSION");

//! # ovpo-cli: CLI Tool for OVPO
//!
//! Provides the `ovpo` command-line interface:
//!
//! - `ovpo version`: crate and schema versions.
//! - `ovpo validate-json`: validate one document against a named schema.
//! - `ovpo validate-folder`: validate every `*.json` under a directory.
//! - `ovpo print-schema`: print a schema document.
//!
//! Every `run_*` function returns the process exit code: 0 on success,
//! 1 on validation failure. Operational errors surface as `Err`.

pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use ovpo_schema::SchemaValidator;

/// Line printed by `ovpo version`.
pub fn version_line() -> String {
    format!(
        "ovpo {} (schemas v{})",
        ovpo_core::OVPO_VERSION,
        ovpo_core::SCHEMA_VERSION
    )
}

/// Execute `ovpo version`.
pub fn run_version() -> Result<u8> {
    println!("{}", version_line());
    Ok(0)
}

/// Load the schema store for the supported version under `schemas_root`.
pub fn load_validator(schemas_root: &Path) -> Result<SchemaValidator> {
    let validator = SchemaValidator::for_schemas_root(schemas_root).with_context(|| {
        format!("failed to load schemas under {}", schemas_root.display())
    })?;
    tracing::debug!(
        schema_count = validator.schema_count(),
        location = %validator.location(),
        "loaded schema store"
    );
    Ok(validator)
}

//! # Schema Errors

use thiserror::Error;

use crate::validate::ValidationViolations;

/// Error raised while loading schemas or validating against them.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No schema with this filename exists in the schema directory.
    #[error("schema not found: '{name}' in {location}")]
    NotFound {
        /// Requested schema filename.
        name: String,
        /// Where the lookup happened (directory path or source label).
        location: String,
    },

    /// A schema file exists but could not be read or parsed as JSON.
    #[error("schema load error for '{name}': {reason}")]
    Load {
        /// Schema filename.
        name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema itself is malformed: unknown dialect, meta-schema
    /// violation, or an unresolvable `$ref`.
    #[error("invalid schema '{name}': {reason}")]
    InvalidSchema {
        /// Schema filename.
        name: String,
        /// What is wrong with the schema.
        reason: String,
    },

    /// The instance did not conform to the schema.
    #[error("validation failed against schema '{schema_name}': {violations}")]
    ValidationFailed {
        /// Schema the instance was validated against.
        schema_name: String,
        /// Every violation reported by the validator, in evaluation order.
        violations: ValidationViolations,
    },

    /// The instance document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },
}

impl SchemaError {
    /// True for faults in the deployed schema set rather than in the
    /// validated payload.
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Load { .. } | Self::InvalidSchema { .. }
        )
    }
}

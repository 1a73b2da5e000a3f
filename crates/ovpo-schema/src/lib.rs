//! # ovpo-schema: Schema Store & Validator
//!
//! Runtime JSON Schema validation for OVPO wire payloads.
//!
//! ## Layers
//!
//! - [`source`]: where schema bytes come from. [`DirectorySource`] reads
//!   `*.json` files from the versioned schema directory
//!   (`schemas/v0.08/`).
//! - [`store`]: [`SchemaStore`], the read-only, process-lifetime mapping
//!   from every reference form of a document (`$id`, `file://` URI, bare
//!   filename) to the parsed document.
//! - [`validate`]: [`SchemaValidator`], which compiles a named schema
//!   against the store (no network access for `$ref`) and validates
//!   instances.
//!
//! ## Crate Policy
//!
//! - A schema that fails its own meta-schema is never used to evaluate an
//!   instance.
//! - Missing or malformed schemas are configuration faults
//!   ([`SchemaError::is_configuration_fault`]) and must be reported
//!   separately from payload violations.
//! - The store is never mutated after construction; share it with `Arc`.

pub mod error;
pub mod source;
pub mod store;
pub mod validate;

pub use error::SchemaError;
pub use source::{DirectorySource, SchemaSource};
pub use store::SchemaStore;
pub use validate::{SchemaValidator, ValidationViolations, Violation};

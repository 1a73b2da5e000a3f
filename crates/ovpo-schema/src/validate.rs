//! # Schema Validation
//!
//! Validates JSON instances against named schemas from a [`SchemaStore`].
//!
//! ## Order of checks
//!
//! 1. Look the schema up by filename.
//! 2. Pick the draft from its `$schema` URI. Unknown dialects are
//!    rejected rather than guessed.
//! 3. Check the schema against that draft's meta-schema.
//! 4. Compile it with a retriever backed by the store, so sibling
//!    `$ref`s resolve locally and unknown ones fail compilation.
//! 5. Evaluate the instance.
//!
//! Steps 1–4 produce configuration errors; only step 5 can produce
//! [`SchemaError::ValidationFailed`]. An instance is never evaluated
//! against a schema that failed step 3.
//!
//! A schema that compiles is cached by name and reused; failures are not
//! cached.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

use crate::error::SchemaError;
use crate::source::{DirectorySource, SchemaSource};
use crate::store::SchemaStore;

/// Resolves `$ref` URIs from the in-memory store. Never touches the network.
struct StoreRetriever {
    store: Arc<SchemaStore>,
}

impl Retrieve for StoreRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        match self.store.resolve(uri_str) {
            Some(document) => Ok(document.as_ref().clone()),
            None => Err(format!("reference '{uri_str}' is not in the schema store").into()),
        }
    }
}

/// A single validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// Human-readable description of the failed constraint.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Non-empty, ordered collection of violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The first violation the validator reported.
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

/// Displays the first violation, plus a count of the rest.
impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.split_first() {
            None => f.write_str("no violations"),
            Some((first, [])) => write!(f, "{first}"),
            Some((first, rest)) => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

/// Schema validator over a read-only [`SchemaStore`].
///
/// `Send + Sync`; share one instance behind `Arc` for the process
/// lifetime. All documents are loaded at construction.
pub struct SchemaValidator {
    source: Arc<dyn SchemaSource>,
    store: Arc<SchemaStore>,
    /// Compiled validators by schema filename.
    compiled: RwLock<HashMap<String, Arc<Validator>>>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("location", &self.source.location())
            .field("schemas", &self.store.names())
            .finish()
    }
}

impl SchemaValidator {
    /// Load every `*.json` document in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Load` if the directory or any document in it
    /// cannot be read or parsed.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::from_source(Arc::new(DirectorySource::new(schema_dir.as_ref())))
    }

    /// Load the documents for the supported schema version under
    /// `schemas_root` (i.e. `<schemas_root>/v0.08`).
    pub fn for_schemas_root(schemas_root: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::new(schemas_root.as_ref().join(ovpo_core::SCHEMA_DIR_NAME))
    }

    /// Build the store from an arbitrary source.
    pub fn from_source(source: Arc<dyn SchemaSource>) -> Result<Self, SchemaError> {
        let store = SchemaStore::build(source.as_ref())?;
        Ok(Self {
            source,
            store: Arc::new(store),
            compiled: RwLock::new(HashMap::new()),
        })
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    pub fn schema_count(&self) -> usize {
        self.store.len()
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.store.names()
    }

    /// Where the schemas were loaded from.
    pub fn location(&self) -> String {
        self.source.location()
    }

    /// Read and parse `name` directly from the source, bypassing the store.
    pub fn load(&self, name: &str) -> Result<Value, SchemaError> {
        let bytes = self.source.get(name)?;
        serde_json::from_slice(&bytes).map_err(|e| SchemaError::Load {
            name: name.to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Compiled validator for `schema_name`, compiling on first use.
    ///
    /// # Errors
    ///
    /// - `SchemaError::NotFound` if no such document is loaded.
    /// - `SchemaError::InvalidSchema` if its dialect is unknown, it fails
    ///   its meta-schema, or a `$ref` cannot be resolved from the store.
    pub fn build_validator(&self, schema_name: &str) -> Result<Arc<Validator>, SchemaError> {
        if let Some(cached) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(schema_name)
        {
            return Ok(Arc::clone(cached));
        }

        let validator = Arc::new(self.compile(schema_name)?);
        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        let entry = compiled
            .entry(schema_name.to_string())
            .or_insert(validator);
        Ok(Arc::clone(entry))
    }

    /// Number of schemas compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn compile(&self, schema_name: &str) -> Result<Validator, SchemaError> {
        let schema: &Value = self
            .store
            .document(schema_name)
            .map(Arc::as_ref)
            .ok_or_else(|| SchemaError::NotFound {
                name: schema_name.to_string(),
                location: self.source.location(),
            })?;

        let draft = check_schema(schema_name, schema)?;

        let mut opts = jsonschema::options();
        opts.with_draft(draft);
        opts.with_retriever(StoreRetriever {
            store: Arc::clone(&self.store),
        });
        opts.build(schema).map_err(|e| SchemaError::InvalidSchema {
            name: schema_name.to_string(),
            reason: format!("cannot compile: {e}"),
        })
    }

    /// Validate `instance` against the schema named `schema_name`.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`build_validator`](Self::build_validator),
    /// or `SchemaError::ValidationFailed` listing every violation.
    pub fn validate(&self, instance: &Value, schema_name: &str) -> Result<(), SchemaError> {
        let validator = self.build_validator(schema_name)?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Read a JSON document from `path` and validate it.
    pub fn validate_file(&self, path: &Path, schema_name: &str) -> Result<(), SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let instance: Value =
            serde_json::from_str(&content).map_err(|e| SchemaError::DocumentLoad {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;
        self.validate(&instance, schema_name)
    }
}

/// Determine the schema's draft and check it against that draft's
/// meta-schema.
fn check_schema(name: &str, schema: &Value) -> Result<Draft, SchemaError> {
    let invalid = |reason: String| SchemaError::InvalidSchema {
        name: name.to_string(),
        reason,
    };

    let draft = dialect_of(schema).map_err(invalid)?;
    jsonschema::meta::validate(schema)
        .map_err(|e| invalid(format!("does not conform to its meta-schema: {e}")))?;
    Ok(draft)
}

/// Map a `$schema` URI to a draft. Schemas without `$schema` use 2020-12.
fn dialect_of(schema: &Value) -> Result<Draft, String> {
    let Some(declared) = schema.get("$schema") else {
        return Ok(Draft::Draft202012);
    };
    let uri = declared
        .as_str()
        .ok_or_else(|| "`$schema` must be a string".to_string())?;

    let normalized = uri
        .trim_end_matches('#')
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    match normalized {
        "json-schema.org/draft-04/schema" => Ok(Draft::Draft4),
        "json-schema.org/draft-06/schema" => Ok(Draft::Draft6),
        "json-schema.org/draft-07/schema" => Ok(Draft::Draft7),
        "json-schema.org/draft/2019-09/schema" => Ok(Draft::Draft201909),
        "json-schema.org/draft/2020-12/schema" => Ok(Draft::Draft202012),
        _ => Err(format!("unsupported `$schema` dialect '{uri}'")),
    }
}

//! # Schema Store
//!
//! Read-only mapping from every reference form of a schema document to
//! the parsed document. A `$ref` may name a sibling by its `$id`, by its
//! `file://` URI, or by bare filename; each form resolves here without
//! further I/O. A bare-filename fallback applies only to relative
//! references and to references under a base the store itself owns.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use crate::error::SchemaError;
use crate::source::SchemaSource;

/// Parsed schema documents indexed by filename and by reference key.
#[derive(Debug, Default)]
pub struct SchemaStore {
    /// Filename -> document.
    documents: HashMap<String, Arc<Value>>,
    /// `$id`, `file://` URI and filename -> document.
    references: HashMap<String, Arc<Value>>,
    /// Directory prefixes (trailing `/`) of every absolute key.
    bases: HashSet<String>,
}

impl SchemaStore {
    /// Scan `source` and register every document under all of its keys.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Load` if any document is unreadable or not
    /// valid JSON. A partially built store is never returned.
    pub fn build(source: &dyn SchemaSource) -> Result<Self, SchemaError> {
        let mut store = Self::default();

        for name in source.list()? {
            let bytes = source.get(&name)?;
            let document: Value =
                serde_json::from_slice(&bytes).map_err(|e| SchemaError::Load {
                    name: name.clone(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            let document = Arc::new(document);

            if let Some(id) = document.get("$id").and_then(Value::as_str) {
                if !id.is_empty() {
                    store.add_base(id);
                    store.references.insert(id.to_string(), Arc::clone(&document));
                }
            }
            if let Some(uri) = source.file_uri(&name) {
                store.add_base(&uri);
                store.references.insert(uri, Arc::clone(&document));
            }
            store.references.insert(name.clone(), Arc::clone(&document));
            store.documents.insert(name, document);
        }

        tracing::debug!(
            documents = store.documents.len(),
            reference_keys = store.references.len(),
            location = %source.location(),
            "schema store built"
        );

        Ok(store)
    }

    /// Document registered under `name` (bare filename).
    pub fn document(&self, name: &str) -> Option<&Arc<Value>> {
        self.documents.get(name)
    }

    /// Resolve a reference URI to a document.
    ///
    /// Tries the URI verbatim (fragment stripped), then its last path
    /// segment as a bare filename when the reference is local (see
    /// [`is_local`](Self::is_local)).
    pub fn resolve(&self, reference: &str) -> Option<&Arc<Value>> {
        let without_fragment = reference.split('#').next().unwrap_or(reference);
        if let Some(doc) = self.references.get(without_fragment) {
            return Some(doc);
        }
        if !self.is_local(without_fragment) {
            return None;
        }
        let filename = without_fragment
            .rsplit('/')
            .next()
            .unwrap_or(without_fragment);
        self.documents.get(filename)
    }

    /// Whether `reference` may fall back to a bare-filename lookup: it is
    /// relative, uses the validator's default `json-schema:` base, or sits
    /// under the directory of a registered `$id` or file URI.
    pub fn is_local(&self, reference: &str) -> bool {
        match url::Url::parse(reference) {
            Err(_) => true,
            Ok(url) if url.scheme() == "json-schema" => true,
            Ok(_) => self.bases.iter().any(|base| reference.starts_with(base.as_str())),
        }
    }

    fn add_base(&mut self, key: &str) {
        if url::Url::parse(key).is_err() {
            return;
        }
        if let Some(slash) = key.rfind('/') {
            self.bases.insert(key[..=slash].to_string());
        }
    }

    /// Filenames of all loaded documents, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Whether `key` is registered verbatim as a reference key.
    pub fn has_reference_key(&self, key: &str) -> bool {
        self.references.contains_key(key)
    }
}

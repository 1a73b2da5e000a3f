//! # Schema Sources
//!
//! A [`SchemaSource`] hands out raw schema documents by filename. The
//! store is built from one; nothing else in the crate touches the
//! filesystem for schema bytes.

use std::path::{Path, PathBuf};

use crate::error::SchemaError;

/// Provider of raw schema documents, keyed by bare filename.
pub trait SchemaSource: Send + Sync {
    /// Filenames of every document this source provides, sorted.
    fn list(&self) -> Result<Vec<String>, SchemaError>;

    /// Raw bytes of the document named `name`.
    fn get(&self, name: &str) -> Result<Vec<u8>, SchemaError>;

    /// Absolute `file://` URI of `name`, when the source is filesystem-backed.
    fn file_uri(&self, name: &str) -> Option<String>;

    /// Human-readable origin used in error messages.
    fn location(&self) -> String;
}

/// Schema documents stored as `*.json` files directly inside one directory.
///
/// Subdirectories (such as `examples/`) are not scanned.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `name` inside the directory, rejecting anything that is not
    /// a bare filename.
    fn path_of(&self, name: &str) -> Option<PathBuf> {
        let bare = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        bare.then(|| self.dir.join(name))
    }

    fn not_found(&self, name: &str) -> SchemaError {
        SchemaError::NotFound {
            name: name.to_string(),
            location: self.location(),
        }
    }
}

impl SchemaSource for DirectorySource {
    fn list(&self) -> Result<Vec<String>, SchemaError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| SchemaError::Load {
            name: self.location(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::Load {
                name: self.location(),
                reason: format!("cannot read directory entry: {e}"),
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn get(&self, name: &str) -> Result<Vec<u8>, SchemaError> {
        let path = self.path_of(name).ok_or_else(|| self.not_found(name))?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(self.not_found(name)),
            Err(e) => Err(SchemaError::Load {
                name: name.to_string(),
                reason: format!("cannot read {}: {e}", path.display()),
            }),
        }
    }

    fn file_uri(&self, name: &str) -> Option<String> {
        let path = self.path_of(name)?;
        let absolute = std::fs::canonicalize(path).ok()?;
        url::Url::from_file_path(absolute)
            .ok()
            .map(|u| u.to_string())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

//! # Validate Subcommands
//!
//! `validate-json` checks a single document; `validate-folder` walks a
//! directory tree and checks every `*.json` file in path order.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use ovpo_schema::SchemaValidator;

/// Arguments for `ovpo validate-json`.
#[derive(Args, Debug)]
pub struct ValidateJsonArgs {
    /// JSON document to validate.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Schema filename, e.g. `ingest_batch.json`.
    #[arg(long)]
    pub schema: String,
}

/// Arguments for `ovpo validate-folder`.
#[derive(Args, Debug)]
pub struct ValidateFolderArgs {
    /// Directory searched recursively for `*.json` files.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Schema filename, e.g. `ingest_batch.json`.
    #[arg(long)]
    pub schema: String,

    /// Stop at the first failing document.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Execute `ovpo validate-json`.
pub fn run_validate_json(args: &ValidateJsonArgs, validator: &SchemaValidator) -> Result<u8> {
    match validator.validate_file(&args.file, &args.schema) {
        Ok(()) => {
            println!("OK");
            Ok(0)
        }
        Err(e) => {
            println!("{}: {e}", args.file.display());
            Ok(1)
        }
    }
}

/// Outcome of validating a folder.
#[derive(Debug, Default)]
pub struct FolderReport {
    /// Documents validated (fewer than found when stopped early).
    pub checked: usize,
    /// `(path, error)` per failing document, in path order.
    pub failures: Vec<(PathBuf, String)>,
}

impl FolderReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validate every `*.json` under `dir` against `schema`.
pub fn validate_folder(
    validator: &SchemaValidator,
    dir: &Path,
    schema: &str,
    fail_fast: bool,
) -> FolderReport {
    let mut report = FolderReport::default();
    for path in find_json_files(dir) {
        report.checked += 1;
        if let Err(e) = validator.validate_file(&path, schema) {
            report.failures.push((path, e.to_string()));
            if fail_fast {
                break;
            }
        }
    }
    report
}

/// Execute `ovpo validate-folder`.
pub fn run_validate_folder(args: &ValidateFolderArgs, validator: &SchemaValidator) -> Result<u8> {
    if !args.dir.is_dir() {
        anyhow::bail!("not a directory: {}", args.dir.display());
    }

    let report = validate_folder(validator, &args.dir, &args.schema, args.fail_fast);
    tracing::info!(
        checked = report.checked,
        failed = report.failures.len(),
        "folder validated"
    );

    if report.passed() {
        println!("OK");
        return Ok(0);
    }
    for (path, error) in &report.failures {
        println!("{}: {error}", path.display());
    }
    Ok(1)
}

/// All `*.json` files under `dir`, recursively, sorted by path. Symlinked
/// files are included; symlinked directories are not descended into.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    walk(dir, &mut results);
    results.sort();
    results
}

fn walk(dir: &Path, acc: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            walk(&path, acc);
        } else if path.extension().is_some_and(|ext| ext == "json")
            && (file_type.is_file() || path.is_file())
        {
            acc.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["name"],
        "properties": {"name": {"type": "string"}}
    }"#;

    fn validator() -> (tempfile::TempDir, SchemaValidator) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("named.json"), SCHEMA).unwrap();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        (dir, validator)
    }

    #[test]
    fn find_json_files_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("b").join("c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("z.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = find_json_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));
        assert!(files[1].ends_with("b/c/z.json"));
    }

    #[cfg(unix)]
    #[test]
    fn find_json_files_does_not_follow_directory_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("docs");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("a.json"), "{}").unwrap();
        std::os::unix::fs::symlink(dir.path(), nested.join("loop")).unwrap();
        std::os::unix::fs::symlink(nested.join("a.json"), nested.join("b.json")).unwrap();

        let files = find_json_files(dir.path());
        assert_eq!(files.len(), 2, "{files:?}");
        assert!(files[0].ends_with("docs/a.json"));
        assert!(files[1].ends_with("docs/b.json"));
    }

    #[test]
    fn find_json_files_missing_dir_is_empty() {
        assert!(find_json_files(Path::new("/nonexistent/ovpo-docs")).is_empty());
    }

    #[test]
    fn folder_report_collects_every_failure() {
        let (_schemas, validator) = validator();
        let docs = tempfile::tempdir().unwrap();
        std::fs::write(docs.path().join("1.json"), r#"{"name": 1}"#).unwrap();
        std::fs::write(docs.path().join("2.json"), r#"{"name": "ok"}"#).unwrap();
        std::fs::write(docs.path().join("3.json"), r#"{}"#).unwrap();

        let report = validate_folder(&validator, docs.path(), "named.json", false);
        assert_eq!(report.checked, 3);
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].0.ends_with("1.json"));
        assert!(report.failures[1].0.ends_with("3.json"));
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let (_schemas, validator) = validator();
        let docs = tempfile::tempdir().unwrap();
        std::fs::write(docs.path().join("1.json"), r#"{}"#).unwrap();
        std::fs::write(docs.path().join("2.json"), r#"{}"#).unwrap();

        let report = validate_folder(&validator, docs.path(), "named.json", true);
        assert_eq!(report.checked, 1);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn run_validate_json_exit_codes() {
        let (_schemas, validator) = validator();
        let docs = tempfile::tempdir().unwrap();
        let good = docs.path().join("good.json");
        let bad = docs.path().join("bad.json");
        std::fs::write(&good, r#"{"name": "x"}"#).unwrap();
        std::fs::write(&bad, r#"{"name": false}"#).unwrap();

        let args = ValidateJsonArgs {
            file: good,
            schema: "named.json".into(),
        };
        assert_eq!(run_validate_json(&args, &validator).unwrap(), 0);

        let args = ValidateJsonArgs {
            file: bad,
            schema: "named.json".into(),
        };
        assert_eq!(run_validate_json(&args, &validator).unwrap(), 1);
    }

    #[test]
    fn run_validate_folder_rejects_missing_dir() {
        let (_schemas, validator) = validator();
        let args = ValidateFolderArgs {
            dir: PathBuf::from("/nonexistent/ovpo-docs"),
            schema: "named.json".into(),
            fail_fast: false,
        };
        assert!(run_validate_folder(&args, &validator).is_err());
    }
}

//! `ovpo print-schema`: print a schema document as pretty JSON with keys
//! sorted at every level.

use anyhow::{Context, Result};
use clap::Args;
use ovpo_schema::SchemaValidator;
use serde_json::{Map, Value};

/// Arguments for `ovpo print-schema`.
#[derive(Args, Debug)]
pub struct PrintSchemaArgs {
    /// Schema filename, e.g. `trace.json`.
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Execute `ovpo print-schema`.
pub fn run_print_schema(args: &PrintSchemaArgs, validator: &SchemaValidator) -> Result<u8> {
    println!("{}", render_schema(validator, &args.name)?);
    Ok(0)
}

/// Read `name` from the schema directory and render it.
pub fn render_schema(validator: &SchemaValidator, name: &str) -> Result<String> {
    let schema = validator
        .load(name)
        .with_context(|| format!("cannot load schema {name}"))?;
    Ok(serde_json::to_string_pretty(&sorted(schema))?)
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = Map::with_capacity(entries.len());
            for (key, value) in entries {
                out.insert(key, sorted(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_sorted_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("s.json"),
            r#"{"type": "object", "properties": {"zeta": {"type": "string"}, "alpha": {"type": "integer"}}}"#,
        )
        .unwrap();
        let validator = SchemaValidator::new(dir.path()).unwrap();

        let rendered = render_schema(&validator, "s.json").unwrap();
        let properties = rendered.find("\"properties\"").unwrap();
        let kind = rendered.rfind("\"type\": \"object\"").unwrap();
        assert!(properties < kind);
        assert!(rendered.find("\"alpha\"").unwrap() < rendered.find("\"zeta\"").unwrap());
    }

    #[test]
    fn unknown_schema_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        assert!(render_schema(&validator, "missing.json").is_err());
    }
}

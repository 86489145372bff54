//! Bundled JSON Schema for spec files.

use anyhow::{Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

/// JSON Schema (Draft 2020-12) describing a spec file.
pub const SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/env_spec/v1.schema.json"
));

/// Validate `doc` against the bundled schema, reporting every violation.
pub fn validate_against_schema(doc: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(SCHEMA).map_err(|err| anyhow!("parse bundled schema: {}", err))?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if compiled.is_valid(doc) {
        return Ok(());
    }
    let messages = compiled
        .iter_errors(doc)
        .map(|err| err.to_string())
        .collect::<Vec<_>>();
    Err(anyhow!("spec schema validation failed: {}", messages.join("; ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate::validate_structure;
    use serde_json::json;

    #[test]
    fn bundled_schema_is_valid_json() {
        let schema: Value = serde_json::from_str(SCHEMA).expect("schema json");
        assert_eq!(schema["type"], "object");
    }

    /// The schema and the structural validator must agree on every shape.
    #[test]
    fn schema_agrees_with_structural_validation() {
        let cases = [
            (json!({}), true),
            (json!({"A": "1"}), true),
            (json!({"A": {}}), true),
            (
                json!({"A": {"value": "x", "required": true, "inherit": false, "doc": "d"}}),
                true,
            ),
            (json!({"X": {"value": 1}}), false),
            (json!({"X": {"required": "true"}}), false),
            (json!({"X": {"doc": null}}), false),
            (json!({"X": {"default": "b"}}), false),
            (json!({"X": 3}), false),
            (json!({"X": ["a"]}), false),
            (json!(["X"]), false),
            (json!("X"), false),
        ];

        for (doc, valid) in cases {
            assert_eq!(
                validate_against_schema(&doc).is_ok(),
                valid,
                "schema: {doc}"
            );
            assert_eq!(validate_structure(&doc).is_ok(), valid, "structure: {doc}");
        }
    }

    #[test]
    fn schema_errors_are_listed() {
        let err = validate_against_schema(&json!({"X": {"value": 1}})).expect_err("invalid");
        assert!(
            err.to_string()
                .starts_with("spec schema validation failed:")
        );
    }
}

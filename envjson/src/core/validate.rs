//! Structural validation of a raw spec document.
//!
//! Stricter than decoding: unknown keys in a value spec are rejected and
//! `null` is not accepted in place of a field. Runs over the parsed JSON tree
//! and never touches an [`Env`](crate::core::env::Env).

use serde_json::{Map, Value};

use crate::error::{FieldProblem, JsonKind, SpecError};

/// Path used in diagnostics for the document root.
pub const ROOT_PATH: &str = "$";

/// Check that `doc` has the shape of a spec file.
///
/// Keys are visited in ascending order; the first problem found is returned.
pub fn validate_structure(doc: &Value) -> Result<(), SpecError> {
    let entries = match doc {
        Value::Object(entries) => entries,
        other => return Err(wrong_type(ROOT_PATH.to_string(), "object", other)),
    };

    let mut names: Vec<&String> = entries.keys().collect();
    names.sort();
    for name in names {
        match &entries[name.as_str()] {
            Value::String(_) => {}
            Value::Object(fields) => validate_value_spec(name, fields)?,
            other => return Err(wrong_type(name.clone(), "string or object", other)),
        }
    }
    Ok(())
}

/// Parse `raw` as JSON, then validate its structure.
pub fn validate_structure_str(raw: &str) -> Result<Value, SpecError> {
    let doc: Value = serde_json::from_str(raw).map_err(SpecError::MalformedSpecDocument)?;
    validate_structure(&doc)?;
    Ok(doc)
}

fn validate_value_spec(name: &str, fields: &Map<String, Value>) -> Result<(), SpecError> {
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();
    for key in keys {
        let field = &fields[key.as_str()];
        let path = format!("{name}.{key}");
        let (expected, ok) = match key.as_str() {
            "value" | "doc" => ("string", field.is_string()),
            "required" | "inherit" => ("boolean", field.is_boolean()),
            _ => {
                return Err(SpecError::InvalidSpecField {
                    path,
                    problem: FieldProblem::UnknownKey,
                });
            }
        };
        if !ok {
            return Err(wrong_type(path, expected, field));
        }
    }
    Ok(())
}

fn wrong_type(path: String, expected: &'static str, actual: &Value) -> SpecError {
    SpecError::InvalidSpecField {
        path,
        problem: FieldProblem::WrongType {
            expected,
            actual: JsonKind::of(actual),
        },
    }
}

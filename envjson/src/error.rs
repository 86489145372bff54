//! Typed failures surfaced by the environment-spec core.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors produced while loading, merging, validating or serializing an
/// environment spec.
///
/// Every variant describes bad input. None of them are transient, so callers
/// should report and stop rather than retry.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A single entry was neither a string nor a well-typed value spec.
    #[error("malformed spec entry: {0}")]
    MalformedSpecEntry(String),

    /// The document was not valid JSON, not an object, or held a malformed entry.
    #[error("malformed spec document: {0}")]
    MalformedSpecDocument(#[source] serde_json::Error),

    /// The spec file could not be opened.
    #[error("unable to read spec file {}", path.display())]
    SpecFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required variables ended up without a value after merging.
    ///
    /// `names` is sorted ascending and never empty.
    #[error("required variable(s) have no value: {}", names.join(", "))]
    MissingRequiredVariable { names: Vec<String> },

    /// Output could not be written to the sink.
    #[error("unable to write output")]
    Serialization(#[source] serde_json::Error),

    /// Structural validation rejected a field.
    #[error("invalid spec field {path}: {problem}")]
    InvalidSpecField { path: String, problem: FieldProblem },
}

/// What structural validation found wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    WrongType {
        expected: &'static str,
        actual: JsonKind,
    },
    /// A key other than `value`, `required`, `inherit` or `doc` in a value spec.
    UnknownKey,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::WrongType { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            FieldProblem::UnknownKey => f.write_str(
                "not a valid key in a value spec (allowed: value, required, inherit, doc)",
            ),
        }
    }
}

/// The kind of a JSON value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        };
        f.write_str(label)
    }
}

//! A single variable's specification and its JSON decoding.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::{Map, Value};

use crate::error::{JsonKind, SpecError};

/// Specification of one environment variable.
///
/// Decoded from either a bare JSON string (the value itself) or an object with
/// optional `value`, `required`, `inherit` and `doc` fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvValue {
    pub value: String,
    /// The variable must end up non-empty after merging.
    pub required: bool,
    /// The value is always taken from the parent environment when present there.
    pub inherit: bool,
    pub doc: String,
    is_set: bool,
}

impl EnvValue {
    /// A plain assigned value with no flags, as produced by a bare JSON string
    /// or a `NAME=VALUE` environment entry.
    pub fn assigned(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_set: true,
            ..Self::default()
        }
    }

    /// True once a value has been assigned by a load or merge step.
    ///
    /// Distinguishes a declared-but-empty variable from one nothing touched.
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Set the declared value, as the object form of a spec entry does: only a
    /// non-empty value counts as set.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.is_set = !self.value.is_empty();
        self
    }

    pub fn with_required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_inherit(mut self) -> Self {
        self.inherit = true;
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub(crate) fn assign(&mut self, value: &str) {
        self.value = value.to_string();
        self.is_set = true;
    }

    /// Decode one spec entry from a parsed JSON value.
    pub fn from_json(raw: &Value) -> Result<Self, SpecError> {
        match raw {
            Value::String(value) => Ok(Self::assigned(value.as_str())),
            Value::Object(fields) => Self::from_fields(fields),
            other => Err(SpecError::MalformedSpecEntry(format!(
                "expected string or object, got {}",
                JsonKind::of(other)
            ))),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Result<Self, SpecError> {
        let value = string_field(fields, "value")?;
        let doc = string_field(fields, "doc")?;
        let required = bool_field(fields, "required")?;
        let inherit = bool_field(fields, "inherit")?;
        let is_set = !value.is_empty();
        Ok(Self {
            value,
            required,
            inherit,
            doc,
            is_set,
        })
    }
}

// Absent and null fields decode to their defaults; unknown keys are left to
// structural validation.
fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, SpecError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SpecError::MalformedSpecEntry(format!(
            "field '{key}' must be a string, got {}",
            JsonKind::of(other)
        ))),
    }
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> Result<bool, SpecError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(SpecError::MalformedSpecEntry(format!(
            "field '{key}' must be a boolean, got {}",
            JsonKind::of(other)
        ))),
    }
}

impl<'de> Deserialize<'de> for EnvValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        EnvValue::from_json(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_is_an_assigned_value() {
        let value = EnvValue::from_json(&json!("default value")).expect("decode");
        assert_eq!(value.value, "default value");
        assert!(!value.required);
        assert!(!value.inherit);
        assert_eq!(value.doc, "");
        assert!(value.is_set());
    }

    #[test]
    fn empty_bare_string_still_counts_as_set() {
        let value = EnvValue::from_json(&json!("")).expect("decode");
        assert_eq!(value.value, "");
        assert!(value.is_set());
    }

    #[test]
    fn bare_string_escapes_are_decoded() {
        let value: EnvValue = serde_json::from_str(r#""a\"b\\c\n""#).expect("decode");
        assert_eq!(value.value, "a\"b\\c\n");
    }

    #[test]
    fn object_decodes_every_field() {
        let value = EnvValue::from_json(&json!({
            "value": "default value",
            "required": true,
            "inherit": true,
            "doc": "the rain in Spain"
        }))
        .expect("decode");
        assert_eq!(value.value, "default value");
        assert!(value.required);
        assert!(value.inherit);
        assert_eq!(value.doc, "the rain in Spain");
        assert!(value.is_set());
    }

    #[test]
    fn object_without_value_is_not_set() {
        let value =
            EnvValue::from_json(&json!({"required": true, "doc": "token"})).expect("decode");
        assert_eq!(value.value, "");
        assert!(value.required);
        assert!(!value.inherit);
        assert!(!value.is_set());
    }

    #[test]
    fn null_fields_take_defaults() {
        let value = EnvValue::from_json(&json!({"value": null, "inherit": null})).expect("decode");
        assert_eq!(value, EnvValue::default());
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let err = EnvValue::from_json(&json!({"required": "yes"})).expect_err("should fail");
        assert!(matches!(err, SpecError::MalformedSpecEntry(_)));
        assert!(
            err.to_string()
                .contains("'required' must be a boolean, got string")
        );

        let err = EnvValue::from_json(&json!({"value": 3})).expect_err("should fail");
        assert!(
            err.to_string()
                .contains("'value' must be a string, got number")
        );
    }

    #[test]
    fn non_string_non_object_is_malformed() {
        for raw in [json!(1), json!(true), json!(null), json!(["a"])] {
            let err = EnvValue::from_json(&raw).expect_err("should fail");
            assert!(matches!(err, SpecError::MalformedSpecEntry(_)), "{raw}");
        }
    }
}

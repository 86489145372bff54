//! Rendering an environment spec as process entries or JSON.

use std::io::Write;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::core::env::Env;
use crate::core::value::EnvValue;
use crate::error::SpecError;

impl Env {
    /// `NAME=VALUE` entries for a child process environment, including empty
    /// values, in ascending name order.
    pub fn to_process_pairs(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value.value))
            .collect()
    }

    /// `(name, value)` tuples for `Command::envs`.
    pub fn to_process_vars(&self) -> Vec<(&str, &str)> {
        self.iter()
            .map(|(name, value)| (name.as_str(), value.value.as_str()))
            .collect()
    }

    /// Write `{name: value}` as pretty-printed JSON with a trailing newline.
    pub fn to_value_json<W: Write>(&self, writer: W) -> Result<(), SpecError> {
        write_json(writer, self)
    }

    /// Write `{name: {value, required, inherit, doc}}` as pretty-printed JSON
    /// with a trailing newline.
    pub fn to_doc_json<W: Write>(&self, writer: W) -> Result<(), SpecError> {
        write_json(writer, &DocView(self))
    }
}

/// Value-only view: flags and docs are stripped.
impl Serialize for Env {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self {
            map.serialize_entry(name, &value.value)?;
        }
        map.end()
    }
}

struct DocView<'a>(&'a Env);

#[derive(Serialize)]
struct DocEntry<'a> {
    value: &'a str,
    required: bool,
    inherit: bool,
    doc: &'a str,
}

impl<'a> From<&'a EnvValue> for DocEntry<'a> {
    fn from(value: &'a EnvValue) -> Self {
        Self {
            value: &value.value,
            required: value.required,
            inherit: value.inherit,
            doc: &value.doc,
        }
    }
}

impl Serialize for DocView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, &DocEntry::from(value))?;
        }
        map.end()
    }
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T) -> Result<(), SpecError> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(SpecError::Serialization)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| SpecError::Serialization(serde_json::Error::io(err)))
}

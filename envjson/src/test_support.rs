//! Test-only helpers for building environment specs and spec files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::env::Env;
use crate::core::value::EnvValue;

/// Build an env from `(name, value)` entries.
pub fn env_of(entries: Vec<(&str, EnvValue)>) -> Env {
    entries.into_iter().collect()
}

/// A required variable with no value of its own.
pub fn required() -> EnvValue {
    EnvValue::default().with_required()
}

/// An inheritable variable with a local fallback value.
pub fn inherited(value: &str) -> EnvValue {
    EnvValue::default().with_value(value).with_inherit()
}

/// A variable that must come from the parent and must be non-empty.
pub fn required_inherited() -> EnvValue {
    EnvValue::default().with_required().with_inherit()
}

/// Write `contents` to `name` under `dir` and return the path.
pub fn write_spec(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write spec file");
    path
}

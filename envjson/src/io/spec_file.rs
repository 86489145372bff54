//! Reading spec documents from disk and standard input.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::core::env::Env;
use crate::error::SpecError;

/// Load a spec file into a fresh [`Env`].
pub fn load_spec_file(path: &Path) -> Result<Env, SpecError> {
    let mut env = Env::new();
    load_spec_file_into(&mut env, path)?;
    Ok(env)
}

/// Load a spec file into `env`, overwriting keys it defines.
pub fn load_spec_file_into(env: &mut Env, path: &Path) -> Result<(), SpecError> {
    debug!(path = %path.display(), "loading spec file");
    let file = File::open(path).map_err(|source| SpecError::SpecFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    env.load_from_reader(BufReader::new(file))
}

/// Read a spec file as a raw JSON tree, for structural validation.
pub fn read_spec_value(path: &Path) -> Result<Value, SpecError> {
    let raw = fs::read_to_string(path).map_err(|source| SpecError::SpecFileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(SpecError::MalformedSpecDocument)
}

/// Load a supplementary spec document from `reader` (usually stdin) into `env`.
pub fn load_stream_into<R: Read>(env: &mut Env, reader: R) -> Result<(), SpecError> {
    debug!("loading spec document from stream");
    env.load_from_reader(BufReader::new(reader))
}

//! The environment spec mapping and its load operations.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::Read;

use tracing::debug;

use crate::core::value::EnvValue;
use crate::error::SpecError;

/// Mapping from variable name to its specification.
///
/// Names are case-sensitive and unique. Entries are kept sorted by name so
/// every rendering of the mapping is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, EnvValue>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&EnvValue> {
        self.vars.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut EnvValue> {
        self.vars.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Insert or replace the entry for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: EnvValue) -> Option<EnvValue> {
        self.vars.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Entries in ascending name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, EnvValue> {
        self.vars.iter()
    }

    /// Decode a JSON object from `reader`, one entry per top-level key.
    ///
    /// Keys already present are overwritten; other existing keys are kept. On
    /// failure the mapping is left unchanged.
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<(), SpecError> {
        let decoded: BTreeMap<String, EnvValue> =
            serde_json::from_reader(reader).map_err(SpecError::MalformedSpecDocument)?;
        debug!(entries = decoded.len(), "decoded spec document");
        self.vars.extend(decoded);
        Ok(())
    }

    /// Fold in `NAME=VALUE` entries as found in a process environment.
    ///
    /// Entries are split on the first `=`. An entry without `=` is taken as a
    /// name with an empty value. Every entry counts as set.
    pub fn load_environ<I, S>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pair in pairs {
            let (name, value) = match pair.as_ref().split_once('=') {
                Some((name, value)) => (name, value),
                None => (pair.as_ref(), ""),
            };
            self.vars.insert(name.to_string(), EnvValue::assigned(value));
        }
    }

    /// Build a mapping from process environment entries.
    pub fn from_environ<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut env = Self::new();
        env.load_environ(pairs);
        env
    }
}

impl<'a> IntoIterator for &'a Env {
    type Item = (&'a String, &'a EnvValue);
    type IntoIter = btree_map::Iter<'a, String, EnvValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, EnvValue)> for Env {
    fn from_iter<T: IntoIterator<Item = (K, EnvValue)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

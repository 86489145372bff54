//! Snapshot of the ambient process environment.

use std::env;

/// Current process environment as `NAME=VALUE` entries.
///
/// Non-UTF-8 names or values are converted lossily.
pub fn current() -> Vec<String> {
    env::vars_os()
        .map(|(name, value)| format!("{}={}", name.to_string_lossy(), value.to_string_lossy()))
        .collect()
}

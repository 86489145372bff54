//! Prepare a process environment from a JSON spec, then run a command in it.
//!
//! A spec file declares the variables the target environment must contain,
//! with optional defaults, documentation, and two flags: `inherit` (take the
//! value from the parent environment) and `required` (must be non-empty once
//! merged). The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (decode, merge, serialize,
//!   structural validation). No file or process I/O.
//! - **[`io`]**: Side-effecting collaborators (spec files, bundled schema,
//!   process environment, launching the command).
//!
//! [`run`] wires the two together for the CLI.

pub mod config;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

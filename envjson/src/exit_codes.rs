//! Stable exit codes for the envjson CLI.

/// Environment displayed, schema printed, or the command exited successfully.
pub const OK: i32 = 0;
/// Load, merge, validation or launch failure.
pub const FAILURE: i32 = 1;
/// A command killed by signal `n` is reported as `SIGNAL_BASE + n`.
pub const SIGNAL_BASE: i32 = 128;

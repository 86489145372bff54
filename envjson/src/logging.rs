//! Diagnostic tracing for envjson.
//!
//! Diagnostics go to stderr only, and nothing in this crate logs to stdout.
//! Stdout has two owners:
//!
//! - in display mode it carries the JSON document, which callers parse
//!   (`envjson env.json | jq .PORT`), so a stray log line would corrupt it;
//! - when a command is launched, the child inherits stdout, so anything
//!   written there would be mixed into the command's own output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=envjson=debug envjson env.json -- printenv
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

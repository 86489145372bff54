//! Orchestration for one envjson invocation.
//!
//! Order of operations:
//! 1. Optionally validate the spec file's structure and schema.
//! 2. Load the local (target) environment from the spec file.
//! 3. Assemble the parent: process environment first (unless ignored), then
//!    the stdin document on top.
//! 4. Merge parent into local.
//! 5. Display the result, or launch the command with it.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::config::{DisplayMode, LaunchMode, RunConfig};
use crate::core::env::Env;
use crate::core::validate::validate_structure;
use crate::exit_codes;
use crate::io::process::{exit_code_for, spawn_and_wait};
use crate::io::schema::validate_against_schema;
use crate::io::spec_file::{load_spec_file, load_stream_into, read_spec_value};

/// Check a spec file's structure, then its conformance to the bundled schema.
pub fn validate_spec_file(path: &Path) -> Result<()> {
    let doc = read_spec_value(path)?;
    validate_structure(&doc).with_context(|| format!("validate {}", path.display()))?;
    validate_against_schema(&doc).with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "spec file is valid");
    Ok(())
}

/// Assemble the parent environment from the process environment and stdin.
pub fn build_parent<R: Read>(config: &RunConfig, environ: &[String], stdin: R) -> Result<Env> {
    let mut parent = Env::new();
    if !config.ignore_environment {
        parent.load_environ(environ);
    }
    if config.read_stdin {
        load_stream_into(&mut parent, stdin).context("read parent spec from stdin")?;
    }
    debug!(
        vars = parent.len(),
        from_environment = !config.ignore_environment,
        from_stdin = config.read_stdin,
        "parent environment assembled"
    );
    Ok(parent)
}

/// Load, reconcile and return the environment the command should run with.
#[instrument(skip_all, fields(spec = %config.spec_file.display()))]
pub fn prepare_env<R: Read>(config: &RunConfig, environ: &[String], stdin: R) -> Result<Env> {
    if config.validate_json {
        validate_spec_file(&config.spec_file)?;
    }

    let mut local = load_spec_file(&config.spec_file)?;
    let parent = build_parent(config, environ, stdin)?;

    let report = local.merge(&parent).context("environment check failed")?;
    if !report.not_in_parent.is_empty() {
        debug!(names = ?report.not_in_parent, "inheritable variables absent from parent");
    }
    info!(
        vars = local.len(),
        inherited = report.inherited.len(),
        "environment prepared"
    );
    Ok(local)
}

/// Print `env` in the requested view.
pub fn display<W: Write>(env: &Env, mode: DisplayMode, out: W) -> Result<()> {
    match mode {
        DisplayMode::Values => env.to_value_json(out),
        DisplayMode::Docs => env.to_doc_json(out),
    }
    .context("write environment to stdout")
}

/// Run envjson end to end and return the exit code to report.
///
/// `environ` is the ambient process environment as `NAME=VALUE` entries.
pub fn execute<R: Read, W: Write>(
    config: &RunConfig,
    environ: &[String],
    stdin: R,
    stdout: W,
) -> Result<i32> {
    config.validate()?;
    let env = prepare_env(config, environ, stdin)?;

    if config.command.is_empty() {
        display(&env, config.display, stdout)?;
        return Ok(exit_codes::OK);
    }

    match config.launch {
        LaunchMode::Spawn => {
            let status = spawn_and_wait(&config.command, &env)?;
            Ok(exit_code_for(status))
        }
        LaunchMode::Exec => exec(config, &env),
    }
}

#[cfg(unix)]
fn exec(config: &RunConfig, env: &Env) -> Result<i32> {
    crate::io::process::exec_replace(&config.command, env)?;
    Ok(exit_codes::FAILURE)
}

#[cfg(not(unix))]
fn exec(_config: &RunConfig, _env: &Env) -> Result<i32> {
    anyhow::bail!("--exec is only supported on unix")
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::test_support::write_spec;

    fn config_for(dir: &Path, contents: &str) -> RunConfig {
        RunConfig::new(write_spec(dir, "env.json", contents))
    }

    fn environ(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(|pair| pair.to_string()).collect()
    }

    fn display_output(config: &RunConfig, env: &[String], stdin: &str) -> Result<(i32, String)> {
        let mut out = Vec::new();
        let code = execute(config, env, stdin.as_bytes(), &mut out)?;
        Ok((code, String::from_utf8(out).expect("utf8")))
    }

    #[test]
    fn inherits_required_value_from_process_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = config_for(
            temp.path(),
            r#"{"SHELL": {"required": true, "inherit": true}, "APP": "demo"}"#,
        );

        let env = prepare_env(&cfg, &environ(&["SHELL=/bin/sh", "PATH=/bin"]), io::empty())
            .expect("prepare");
        assert_eq!(env.get("SHELL").expect("SHELL").value, "/bin/sh");
        assert_eq!(env.get("APP").expect("APP").value, "demo");
        assert!(!env.contains("PATH"));
    }

    #[test]
    fn stdin_overlays_process_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(
            temp.path(),
            r#"{"TOKEN": {"required": true, "inherit": true}}"#,
        );
        cfg.read_stdin = true;

        let env = prepare_env(
            &cfg,
            &environ(&["TOKEN=from-env"]),
            r#"{"TOKEN": "from-stdin"}"#.as_bytes(),
        )
        .expect("prepare");
        assert_eq!(env.get("TOKEN").expect("TOKEN").value, "from-stdin");
    }

    #[test]
    fn ignore_environment_hides_process_environment() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(
            temp.path(),
            r#"{"HOME": {"required": true, "inherit": true}}"#,
        );
        cfg.ignore_environment = true;

        let err =
            prepare_env(&cfg, &environ(&["HOME=/root"]), io::empty()).expect_err("should fail");
        assert!(format!("{err:#}").contains("required variable(s) have no value: HOME"));
    }

    #[test]
    fn ignore_environment_with_stdin_uses_stdin_only() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(
            temp.path(),
            r#"{"HOME": {"required": true, "inherit": true}}"#,
        );
        cfg.ignore_environment = true;
        cfg.read_stdin = true;

        let env = prepare_env(
            &cfg,
            &environ(&["HOME=/root"]),
            r#"{"HOME": "/srv"}"#.as_bytes(),
        )
        .expect("prepare");
        assert_eq!(env.get("HOME").expect("HOME").value, "/srv");
    }

    #[test]
    fn missing_required_reports_context() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = config_for(temp.path(), r#"{"TOKEN": {"required": true}}"#);

        let err = prepare_env(&cfg, &[], io::empty()).expect_err("should fail");
        let rendered = format!("{err:#}");
        assert!(rendered.starts_with("environment check failed"));
        assert!(rendered.contains("TOKEN"));
    }

    #[test]
    fn validate_json_rejects_bad_field_before_loading() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(temp.path(), r#"{"X": {"value": "a", "extra": true}}"#);

        // Decoding ignores unknown keys, so only validation catches this.
        prepare_env(&cfg, &[], io::empty()).expect("lenient load");

        cfg.validate_json = true;
        let err = prepare_env(&cfg, &[], io::empty()).expect_err("should fail");
        assert!(format!("{err:#}").contains("invalid spec field X.extra"));
    }

    #[test]
    fn bad_stdin_document_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(temp.path(), r#"{"A": "1"}"#);
        cfg.read_stdin = true;

        let err = prepare_env(&cfg, &[], "not json".as_bytes()).expect_err("should fail");
        assert!(format!("{err:#}").contains("read parent spec from stdin"));
    }

    #[test]
    fn no_command_displays_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = config_for(
            temp.path(),
            r#"{"B": "2", "A": {"value": "1", "doc": "first"}}"#,
        );

        let (code, out) = display_output(&cfg, &[], "").expect("execute");
        assert_eq!(code, exit_codes::OK);
        assert_eq!(out, "{\n  \"A\": \"1\",\n  \"B\": \"2\"\n}\n");
    }

    #[test]
    fn display_docs_shows_flags_and_docs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut cfg = config_for(temp.path(), r#"{"A": {"value": "1", "doc": "first"}}"#);
        cfg.display = DisplayMode::Docs;

        let (_, out) = display_output(&cfg, &[], "").expect("execute");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(parsed["A"]["doc"], "first");
        assert_eq!(parsed["A"]["required"], false);
    }

    #[test]
    fn invalid_config_is_rejected_before_loading() {
        let cfg = RunConfig {
            launch: LaunchMode::Exec,
            ..RunConfig::new("does-not-exist.json")
        };
        let err = display_output(&cfg, &[], "").expect_err("should fail");
        assert!(err.to_string().contains("--exec requires a command"));
    }
}

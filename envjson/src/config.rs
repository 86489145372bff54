//! Run configuration assembled from the command line.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, anyhow};

/// What to print when no command is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// `{name: value}`.
    #[default]
    Values,
    /// `{name: {value, required, inherit, doc}}`.
    Docs,
}

/// How to start the command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchMode {
    /// Spawn a child, relay signals to it, and exit with its status.
    #[default]
    Spawn,
    /// Replace this process with the command (unix only).
    Exec,
}

/// Validated inputs for one envjson run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// JSON spec describing the target environment.
    pub spec_file: PathBuf,

    /// Command and arguments to launch. Empty means display the environment.
    pub command: Vec<OsString>,

    /// Overlay a spec document read from stdin onto the parent environment.
    pub read_stdin: bool,

    /// Do not seed the parent environment from this process's environment.
    pub ignore_environment: bool,

    /// Structurally validate the spec file before loading it.
    pub validate_json: bool,

    pub display: DisplayMode,

    pub launch: LaunchMode,
}

impl RunConfig {
    pub fn new(spec_file: impl Into<PathBuf>) -> Self {
        Self {
            spec_file: spec_file.into(),
            command: Vec::new(),
            read_stdin: false,
            ignore_environment: false,
            validate_json: false,
            display: DisplayMode::default(),
            launch: LaunchMode::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spec_file.as_os_str().is_empty() {
            return Err(anyhow!("spec file path must not be empty"));
        }
        if self.launch == LaunchMode::Exec {
            if self.command.is_empty() {
                return Err(anyhow!("--exec requires a command"));
            }
            if !cfg!(unix) {
                return Err(anyhow!("--exec is only supported on unix"));
            }
        }
        if self.display == DisplayMode::Docs && !self.command.is_empty() {
            return Err(anyhow!("--display-docs cannot be combined with a command"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_display_values_and_spawn() {
        let cfg = RunConfig::new("env.json");
        assert_eq!(cfg.display, DisplayMode::Values);
        assert_eq!(cfg.launch, LaunchMode::Spawn);
        cfg.validate().expect("valid");
    }

    #[test]
    fn exec_requires_command() {
        let cfg = RunConfig {
            launch: LaunchMode::Exec,
            ..RunConfig::new("env.json")
        };
        let err = cfg.validate().expect_err("should fail");
        assert!(err.to_string().contains("--exec requires a command"));
    }

    #[test]
    fn docs_cannot_be_combined_with_command() {
        let cfg = RunConfig {
            display: DisplayMode::Docs,
            command: vec![OsString::from("true")],
            ..RunConfig::new("env.json")
        };
        let err = cfg.validate().expect_err("should fail");
        assert!(err.to_string().contains("--display-docs"));
    }

    #[test]
    fn empty_spec_path_is_rejected() {
        assert!(RunConfig::new("").validate().is_err());
    }
}

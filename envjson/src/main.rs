//! envjson: run a command in an environment described by a JSON spec.
//!
//! With no command, prints the reconciled environment as JSON instead.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;

use envjson::config::{DisplayMode, LaunchMode, RunConfig};
use envjson::io::environ;
use envjson::io::schema::SCHEMA;
use envjson::{exit_codes, logging, run};

#[derive(Parser, Debug)]
#[command(
    name = "envjson",
    version,
    about = "Prepare an environment from a JSON spec, then run a command in it"
)]
struct Cli {
    /// Read a parent spec document from stdin (a bare `-` works too).
    #[arg(long)]
    stdin: bool,

    /// Do not take parent values from this process's environment.
    #[arg(short, long)]
    ignore_environment: bool,

    /// Check the spec file's structure before loading it.
    #[arg(short, long)]
    validate_json: bool,

    /// Without a command, print variable docs and flags instead of values.
    #[arg(short, long)]
    display_docs: bool,

    /// Replace this process with the command instead of spawning it.
    #[arg(long)]
    exec: bool,

    /// Print the JSON Schema for spec files and exit.
    #[arg(long, exclusive = true)]
    print_schema: bool,

    /// JSON spec describing the target environment.
    #[arg(required_unless_present = "print_schema")]
    spec_file: Option<PathBuf>,

    /// Command to run, with its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

impl Cli {
    fn into_config(self) -> Option<RunConfig> {
        let spec_file = self.spec_file?;
        Some(RunConfig {
            command: self.command,
            read_stdin: self.stdin,
            ignore_environment: self.ignore_environment,
            validate_json: self.validate_json,
            display: if self.display_docs {
                DisplayMode::Docs
            } else {
                DisplayMode::Values
            },
            launch: if self.exec {
                LaunchMode::Exec
            } else {
                LaunchMode::Spawn
            },
            ..RunConfig::new(spec_file)
        })
    }
}

/// Rewrite a bare `-` among the leading options to `--stdin`.
///
/// Scanning stops at the first positional argument (the spec file) or `--`,
/// so a `-` meant for the command is left alone.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut in_options = true;
    for (idx, arg) in args.into_iter().enumerate() {
        if idx > 0 && in_options {
            if arg == "-" {
                out.push(OsString::from("--stdin"));
                continue;
            }
            if arg == "--" || !arg.to_string_lossy().starts_with('-') {
                in_options = false;
            }
        }
        out.push(arg);
    }
    out
}

fn main() {
    logging::init();

    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                // Usage errors share the generic failure code.
                let _ = err.print();
                std::process::exit(exit_codes::FAILURE);
            }
        },
    };

    match dispatch(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("envjson: error: {:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn dispatch(cli: Cli) -> Result<i32> {
    if cli.print_schema {
        print!("{SCHEMA}");
        return Ok(exit_codes::OK);
    }
    let config = cli.into_config()
        .ok_or_else(|| anyhow::anyhow!("missing spec file"))?;
    run::execute(
        &config,
        &environ::current(),
        io::stdin().lock(),
        io::stdout().lock(),
    )
}

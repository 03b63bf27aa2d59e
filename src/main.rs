//! verso-install
//!
//! The `install` subcommand of the verso runtime version manager. Builds are
//! delegated to `verso-build`; this binary handles hooks, existing installs,
//! build configuration, cleanup of failed installs and the final rehash.

use clap::Parser;
use clap::error::ErrorKind;
use miette::Diagnostic;

mod builder;
mod cli;
mod commands;
mod config;
mod diagnose;
mod error;
mod hooks;
mod logging;
mod operations;
mod prefix;
mod prompt;
mod rehash;
mod request;
mod transaction;
mod versions;

use cli::InstallArgs;
use config::Settings;
use error::{Result, VersoError};

/// Parse arguments, or `None` once help has been printed
fn parse_args() -> Result<Option<InstallArgs>> {
    match InstallArgs::try_parse() {
        Ok(args) => Ok(Some(args)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Ok(None)
        }
        Err(e) => Err(cli::usage_error(&e)),
    }
}

fn run() -> Result<i32> {
    let Some(args) = parse_args()? else {
        return Ok(0);
    };
    let settings = Settings::from_env()?;
    logging::init(settings.debug);
    commands::install::run(args, &settings)
}

fn report_error(err: &VersoError) {
    eprintln!("verso-install: {err}");
    if let Some(help) = err.help() {
        eprintln!("  help: {help}");
    }
    if matches!(err, VersoError::Usage { .. } | VersoError::NoDefinition) {
        eprint!("\n{}", cli::usage());
        eprintln!();
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}

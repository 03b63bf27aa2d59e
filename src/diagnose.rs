//! Classification of builder exit statuses
//!
//! Classification only adds guidance on stderr; it never changes the exit
//! status of the install.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use console::Style;
use tracing::debug;

use crate::builder::{BUILDER_PROGRAM, Definitions};

/// Builder exit status meaning the definition does not exist
pub const DEFINITION_NOT_FOUND_STATUS: i32 = 2;

/// How a build ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    DefinitionNotFound,
    OtherFailure,
}

impl Classification {
    pub fn of(status: i32) -> Self {
        match status {
            0 => Classification::Success,
            DEFINITION_NOT_FOUND_STATUS => Classification::DefinitionNotFound,
            _ => Classification::OtherFailure,
        }
    }
}

/// Exit status of the build together with its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
    pub status: i32,
    pub classified: Classification,
}

impl InstallOutcome {
    pub fn from_status(status: i32) -> Self {
        Self {
            status,
            classified: Classification::of(status),
        }
    }

    pub fn is_success(&self) -> bool {
        self.classified == Classification::Success
    }
}

/// How the builder itself was installed, for the upgrade hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    Homebrew,
    GitCheckout(PathBuf),
    Unknown,
}

impl InstallSource {
    /// Inspect the directory the builder was installed into
    pub fn detect(install_dir: &Path) -> Self {
        if homebrew_prefix().is_some_and(|prefix| install_dir.starts_with(prefix)) {
            InstallSource::Homebrew
        } else if install_dir.join(".git").is_dir() {
            InstallSource::GitCheckout(install_dir.to_path_buf())
        } else {
            InstallSource::Unknown
        }
    }
}

fn homebrew_prefix() -> Option<PathBuf> {
    let brew = which::which("brew").ok()?;
    let output = Command::new(brew).arg("--prefix").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let prefix = String::from_utf8(output.stdout).ok()?;
    let prefix = prefix.trim();
    (!prefix.is_empty()).then(|| PathBuf::from(prefix))
}

/// Names among `definitions` containing `definition`
pub fn candidates(definitions: Definitions, definition: &str) -> Vec<String> {
    definitions
        .filter(|name| name.contains(definition))
        .collect()
}

/// Explain a missing definition: close matches, where to find the full
/// list, and how to upgrade the builder
pub fn write_definition_not_found(
    out: &mut dyn Write,
    definition: &str,
    candidates: &[String],
    source: &InstallSource,
) -> io::Result<()> {
    let bold = Style::new().bold().for_stderr();

    if !candidates.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "The following versions contain `{definition}' in the name:"
        )?;
        for candidate in candidates {
            writeln!(out, "  {}", bold.apply_to(candidate))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "See all available versions with `verso install --list'.")?;
    writeln!(out)?;
    write!(
        out,
        "If the version you need is missing, try upgrading {BUILDER_PROGRAM}"
    )?;
    match source {
        InstallSource::Homebrew => {
            writeln!(out, ":\n")?;
            writeln!(out, "  brew update && brew upgrade {BUILDER_PROGRAM}")?;
        }
        InstallSource::GitCheckout(dir) => {
            writeln!(out, ":\n")?;
            writeln!(out, "  cd {} && git pull && cd -", dir.display())?;
        }
        InstallSource::Unknown => writeln!(out, ".")?,
    }
    Ok(())
}

/// Print guidance for `outcome` on stderr.
///
/// Lookups feeding the message are best effort; nothing here can fail the
/// install.
pub fn report<D, S>(outcome: &InstallOutcome, definition: &str, definitions: D, source: S)
where
    D: FnOnce() -> crate::error::Result<Definitions>,
    S: FnOnce() -> InstallSource,
{
    if outcome.classified != Classification::DefinitionNotFound {
        return;
    }

    let candidates = match definitions() {
        Ok(definitions) => candidates(definitions, definition),
        Err(e) => {
            debug!(error = %e, "could not list definitions");
            Vec::new()
        }
    };
    let source = source();
    let mut stderr = io::stderr().lock();
    if let Err(e) = write_definition_not_found(&mut stderr, definition, &candidates, &source) {
        debug!(error = %e, "could not write guidance");
    }
}

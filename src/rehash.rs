//! Shim refresh after a successful install

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::config::Settings;

/// Rehash executable name looked up on PATH
pub const REHASH_PROGRAM: &str = "verso-rehash";

/// Regenerates command shims
pub trait Rehasher {
    fn rehash(&self);
}

/// Rehash through the verso-rehash executable
#[derive(Debug, Clone)]
pub struct ExternalRehash {
    program: Option<PathBuf>,
}

impl ExternalRehash {
    /// Locate the rehash command from `VERSO_REHASH_BIN` or PATH
    pub fn locate(settings: &Settings) -> Self {
        let program = settings
            .rehash
            .clone()
            .or_else(|| which::which(REHASH_PROGRAM).ok());
        Self { program }
    }
}

impl Rehasher for ExternalRehash {
    fn rehash(&self) {
        let Some(program) = &self.program else {
            warn!("{REHASH_PROGRAM} not found, shims were not refreshed");
            return;
        };

        debug!(program = %program.display(), "rehashing");
        match Command::new(program).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%status, "rehash failed"),
            Err(e) => warn!(error = %e, "could not run {}", program.display()),
        }
    }
}

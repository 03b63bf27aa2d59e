//! Turning parsed arguments into an install request

use crate::cli::InstallArgs;
use crate::error::{Result, VersoError};

/// A fully specified install request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Version name or path to a definition file
    pub definition: String,
    pub force: bool,
    pub skip_existing: bool,
    pub keep: bool,
    pub verbose: bool,
    /// Patch data is piped to verso-build on stdin
    pub patch: bool,
    pub debug: bool,
}

impl InstallRequest {
    /// Create a request with all flags unset
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            ..Self::default()
        }
    }
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the available definitions
    List,
    /// Print the builder's version
    BuilderVersion,
    Install(InstallRequest),
}

impl Action {
    /// Resolve the action for `args`, falling back to `local_version`
    /// when no definition was given
    pub fn from_args<F>(args: InstallArgs, local_version: F) -> Result<Self>
    where
        F: FnOnce() -> Option<String>,
    {
        if args.version {
            return Ok(Action::BuilderVersion);
        }
        if args.list {
            return Ok(Action::List);
        }

        let definition = args
            .definition
            .filter(|d| !d.is_empty())
            .or_else(local_version)
            .ok_or(VersoError::NoDefinition)?;

        Ok(Action::Install(InstallRequest {
            force: args.force,
            skip_existing: args.skip_existing,
            keep: args.keep,
            verbose: args.verbose,
            patch: args.patch,
            debug: args.debug,
            ..InstallRequest::new(definition)
        }))
    }
}

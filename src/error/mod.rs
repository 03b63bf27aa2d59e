//! Error types and handling for verso-install
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostics.
//!
//! Sub-modules provide convenience constructors by error domain:
//! - [`build`]: builder process errors
//! - [`config`]: settings and hook manifest errors
//! - [`fs`]: file system errors
//! - [`hook`]: hook execution errors
//!
//! A failing `verso-build` run is not an error here: its exit status is an
//! install outcome and becomes the process exit code verbatim.

pub mod build;
pub mod config;
pub mod fs;
pub mod hook;

use miette::Diagnostic;
use thiserror::Error;

/// Exit code used for usage errors, declined prompts and internal failures
pub const EXIT_FAILURE: i32 = 1;

/// Exit code used when the install was interrupted by SIGINT
pub const EXIT_INTERRUPTED: i32 = 130;

/// Main error type for install operations
#[derive(Error, Diagnostic, Debug)]
pub enum VersoError {
    // Usage errors
    #[error("{message}")]
    #[diagnostic(
        code(verso::usage),
        help("Run 'verso install --help' for usage")
    )]
    Usage { message: String },

    #[error("No version specified and no local version is configured")]
    #[diagnostic(
        code(verso::usage::no_definition),
        help("Pass a version, or set one with a .verso-version file")
    )]
    NoDefinition,

    #[error("Installation into {prefix} declined")]
    #[diagnostic(code(verso::prefix::declined))]
    ConflictDeclined { prefix: String },

    #[error("Failed to read confirmation: {reason}")]
    #[diagnostic(code(verso::prefix::prompt_failed))]
    PromptFailed { reason: String },

    // Builder errors
    #[error("Could not find the verso-build executable")]
    #[diagnostic(
        code(verso::build::not_found),
        help("Install verso-build and make sure it is on PATH, or set VERSO_BUILD_BIN")
    )]
    BuilderNotFound,

    #[error("Failed to run {program}: {reason}")]
    #[diagnostic(code(verso::build::spawn_failed))]
    SpawnFailed { program: String, reason: String },

    #[error("Installation interrupted")]
    #[diagnostic(code(verso::interrupted))]
    Interrupted,

    // Hook errors
    #[error("Hook '{name}' failed: {reason}")]
    #[diagnostic(code(verso::hook::failed))]
    HookFailed { name: String, reason: String },

    #[error("Invalid hook manifest {path}: {reason}")]
    #[diagnostic(
        code(verso::hook::invalid_manifest),
        help("Hook manifests take optional 'version_name', 'before_install' and 'after_install' keys")
    )]
    HookManifestInvalid { path: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(verso::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(verso::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to remove {path}: {reason}")]
    #[diagnostic(code(verso::fs::remove_failed))]
    RemoveFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(verso::fs::io_error))]
    IoError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl VersoError {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            VersoError::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

impl From<std::io::Error> for VersoError {
    fn from(err: std::io::Error) -> Self {
        VersoError::IoError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<inquire::InquireError> for VersoError {
    fn from(err: inquire::InquireError) -> Self {
        match err {
            inquire::InquireError::OperationInterrupted => VersoError::Interrupted,
            err => VersoError::PromptFailed {
                reason: err.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, VersoError>;

//! Builder process errors

use super::VersoError;

/// Creates an error for a missing verso-build executable
pub fn not_found() -> VersoError {
    VersoError::BuilderNotFound
}

/// Creates an error for a child process that could not be started
pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> VersoError {
    VersoError::SpawnFailed {
        program: program.into(),
        reason: reason.into(),
    }
}

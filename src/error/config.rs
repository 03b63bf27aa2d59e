//! Configuration errors

use super::VersoError;

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> VersoError {
    VersoError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates an invalid hook manifest error
pub fn manifest_invalid(path: impl Into<String>, reason: impl Into<String>) -> VersoError {
    VersoError::HookManifestInvalid {
        path: path.into(),
        reason: reason.into(),
    }
}

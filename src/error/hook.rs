//! Hook errors

use super::VersoError;

/// Creates a hook failure error
pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> VersoError {
    VersoError::HookFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

//! File system errors

use super::VersoError;

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> VersoError {
    VersoError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a directory removal error
pub fn remove_failed(path: impl Into<String>, reason: impl Into<String>) -> VersoError {
    VersoError::RemoveFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error wrapping its cause
pub fn io_error<E>(message: impl Into<String>, source: E) -> VersoError
where
    E: std::error::Error + Send + Sync + 'static,
{
    VersoError::IoError {
        message: message.into(),
        source: Some(Box::new(source)),
    }
}

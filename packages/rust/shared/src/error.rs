//! Error types for Lectern.
//!
//! Library crates use [`LecternError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Lectern operations.
#[derive(Debug, thiserror::Error)]
pub enum LecternError {
    /// Configuration loading or validation error. Also raised when the
    /// order file is missing for a working directory the Normalizer was
    /// pointed at.
    #[error("config error: {message}")]
    Config { message: String },

    /// Unreadable or malformed ZIP container.
    #[error("archive error: {0}")]
    Archive(String),

    /// OPF manifest parsing error.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad path, nothing to process, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Completion-endpoint request or response error.
    #[error("dispatch error: {0}")]
    Dispatch(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LecternError>;

impl LecternError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LecternError::config("order file missing");
        assert_eq!(err.to_string(), "config error: order file missing");

        let err = LecternError::Archive("not a zip".into());
        assert!(err.to_string().contains("not a zip"));
    }
}

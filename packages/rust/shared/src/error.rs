//! Error types for tbcindex.
//!
//! Library crates use [`TbcIndexError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tbcindex operations.
#[derive(Debug, thiserror::Error)]
pub enum TbcIndexError {
    /// The index page has no table whose header row carries the TOC marker.
    ///
    /// This is the only failure the extraction core itself produces.
    #[error("could not find table of contents table")]
    TocTableNotFound,

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty match patterns, bad limits, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TbcIndexError>;

impl TbcIndexError {
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
        let err = TbcIndexError::TocTableNotFound;
        assert_eq!(err.to_string(), "could not find table of contents table");

        let err = TbcIndexError::config("missing [source] section");
        assert_eq!(err.to_string(), "config error: missing [source] section");

        let err = TbcIndexError::validation("external_prefix must not be empty");
        assert!(err.to_string().contains("external_prefix"));
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = TbcIndexError::io("tbc/a/index.html", source);
        let msg = err.to_string();
        assert!(msg.contains("tbc/a/index.html"));
        assert!(msg.contains("gone"));
    }
}

//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = OdiaBpeError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, IO, or model persistence.
#[derive(Debug, Error)]
pub enum OdiaBpeError {
    /// Training or ingestion configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// A persisted model parsed correctly but violates a model invariant.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for OdiaBpeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl OdiaBpeError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    /// Returns true when the error originates from reading or parsing a stored model.
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Serialization(_) | Self::InvalidModel(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_render_their_path() {
        let err = OdiaBpeError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            Some(PathBuf::from("model.json")),
        );
        let message = err.to_string();
        assert!(message.contains("model.json"));
        assert!(message.contains("gone"));
        assert!(err.is_load_failure());
    }

    #[test]
    fn config_errors_are_not_load_failures() {
        let err = OdiaBpeError::InvalidConfig("min_frequency".into());
        assert!(!err.is_load_failure());
    }
}

//! Unified error types for IdPool.
//!
//! Store backends and allocators map their internal failures into
//! [`AppError`] so callers can branch on a single [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// Error categorization shared by every allocator and store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Invalid construction arguments or configuration.
    Configuration,
    /// An id passed to a release call is outside the configured range.
    Validation,
    /// Communication with the coordination store failed.
    TransientStore,
    /// The store does not know the cached script handle.
    ScriptMissing,
    /// No id could be produced within the range or attempt budget.
    PoolExhausted,
    /// A value read back from the store could not be parsed.
    CorruptState,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An unexpected internal condition (e.g. an unknown script reply).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::TransientStore => write!(f, "TRANSIENT_STORE"),
            Self::ScriptMissing => write!(f, "SCRIPT_MISSING"),
            Self::PoolExhausted => write!(f, "POOL_EXHAUSTED"),
            Self::CorruptState => write!(f, "CORRUPT_STATE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified error used throughout IdPool.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a transient store error.
    pub fn transient_store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransientStore, message)
    }

    /// Create a script-missing error.
    pub fn script_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ScriptMissing, message)
    }

    /// Create a pool-exhausted error.
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PoolExhausted, message)
    }

    /// Create a corrupt-state error.
    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CorruptState, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether the caller may reasonably retry the same call later.
    ///
    /// Only store communication failures qualify. Exhaustion, corruption and
    /// configuration problems do not go away by retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::TransientStore
    }

    /// Returns `true` if this is a pool exhaustion error.
    pub fn is_pool_exhausted(&self) -> bool {
        self.kind == ErrorKind::PoolExhausted
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::pool_exhausted("pool 'lobby' is exhausted");
        assert_eq!(err.to_string(), "POOL_EXHAUSTED: pool 'lobby' is exhausted");
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(AppError::transient_store("connection reset").is_retryable());
        assert!(!AppError::pool_exhausted("full").is_retryable());
        assert!(!AppError::corrupt_state("bad value").is_retryable());
        assert!(!AppError::script_missing("NOSCRIPT").is_retryable());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::TransientStore, "store down", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::TransientStore);
        assert!(cloned.source.is_none());
    }
}

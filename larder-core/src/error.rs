//! Error types for Larder operations

use std::path::PathBuf;
use thiserror::Error;

/// Remote source errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Could not reach {provider}: {reason}")]
    RemoteUnavailable { provider: String, reason: String },

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("{operation} against {provider} timed out after {timeout_ms}ms")]
    TimedOut {
        provider: String,
        operation: String,
        timeout_ms: u64,
    },
}

/// Local storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable at {path:?}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("Corrupt record at {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

/// Coarse classification used to decide whether a failure degrades or propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Blank id or search term. Handled locally with an empty result.
    InvalidInput,
    /// Network failure, non-2xx status, bad payload or timeout.
    RemoteUnavailable,
    /// A stored record could not be decoded.
    StorageCorrupt,
    /// A stored record could not be read or written.
    StorageUnavailable,
}

/// Master error type for all Larder errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LarderError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl LarderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Source(_) => ErrorKind::RemoteUnavailable,
            Self::Storage(StorageError::Corrupt { .. }) => ErrorKind::StorageCorrupt,
            Self::Storage(StorageError::Unavailable { .. }) => ErrorKind::StorageUnavailable,
            Self::Validation(_) => ErrorKind::InvalidInput,
        }
    }

    /// Shorthand for a blank-input validation error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        })
    }
}

/// Result type alias for Larder operations.
pub type LarderResult<T> = Result<T, LarderError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display_request_failed() {
        let err = SourceError::RequestFailed {
            provider: "themealdb".to_string(),
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("themealdb"));
        assert!(msg.contains("503"));
    }

    #[test]
    fn test_source_error_display_timed_out() {
        let err = SourceError::TimedOut {
            provider: "themealdb".to_string(),
            operation: "lookup".to_string(),
            timeout_ms: 1500,
        };
        let msg = err.to_string();
        assert!(msg.contains("lookup"));
        assert!(msg.contains("1500ms"));
    }

    #[test]
    fn test_kind_classification() {
        let remote: LarderError = SourceError::RemoteUnavailable {
            provider: "p".to_string(),
            reason: "dns".to_string(),
        }
        .into();
        assert_eq!(remote.kind(), ErrorKind::RemoteUnavailable);

        let corrupt: LarderError = StorageError::Corrupt {
            path: PathBuf::from("cache_1.json"),
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(corrupt.kind(), ErrorKind::StorageCorrupt);

        let unavailable: LarderError = StorageError::Unavailable {
            path: PathBuf::from("/ro"),
            reason: "read-only".to_string(),
        }
        .into();
        assert_eq!(unavailable.kind(), ErrorKind::StorageUnavailable);

        assert_eq!(
            LarderError::invalid_input("term", "must not be blank").kind(),
            ErrorKind::InvalidInput
        );
    }
}

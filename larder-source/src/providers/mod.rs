//! Remote source implementations
//!
//! Concrete implementations of the [`RemoteSource`](crate::RemoteSource)
//! trait, plus the error constructors they share.

pub mod mealdb;

use larder_core::SourceError;

pub(crate) fn remote_unavailable(provider: &str, reason: impl Into<String>) -> SourceError {
    SourceError::RemoteUnavailable {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn request_failed(provider: &str, status: u16, message: impl Into<String>) -> SourceError {
    SourceError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> SourceError {
    SourceError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}

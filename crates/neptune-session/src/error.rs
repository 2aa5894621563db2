//! Session error types.
//!
//! Storage failures are never fatal to the session: the store logs them and
//! falls back to "no persisted credential". Auth failures are surfaced to the
//! user through [`AuthApiError::user_message`].

use std::path::PathBuf;
use thiserror::Error;

/// Durable storage error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File I/O error.
    #[error("Failed to {operation} storage entry '{key}' at {path}")]
    Io {
        operation: &'static str,
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters that cannot be used as a file name.
    #[error("Invalid storage key '{key}'")]
    InvalidKey { key: String },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete write of storage entry '{key}'")]
    AtomicWriteFailed {
        key: String,
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backend cannot be used at all (e.g. poisoned lock).
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StorageError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the session file at {}", operation, path.display()),
            Self::InvalidKey { key } => format!("'{}' cannot be used as a storage key", key),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the session to {}. Please check disk space and permissions.",
                target_path.display()
            ),
            Self::Unavailable { .. } => "Session storage is not available.".to_string(),
        }
    }
}

/// Error returned by the remote auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AuthApiError {
    /// The server rejected the request and supplied a reason.
    #[error("request rejected: {detail}")]
    Rejected { detail: String },

    /// The server could not be reached or answered with garbage.
    #[error("network error: {0}")]
    Network(String),
}

impl AuthApiError {
    /// Message shown to the operator after a failed login.
    ///
    /// Server-supplied details are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { detail } => detail.clone(),
            Self::Network(_) => {
                "Could not connect to the server. Please check your connection and try again."
                    .to_string()
            }
        }
    }

    /// Returns whether retrying the same request might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

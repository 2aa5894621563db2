//! Catalog error types.
//!
//! Lookup failures never block the operator: the entry form turns them into
//! empty option sets and logs them. They are still typed so callers can
//! report or retry.

use thiserror::Error;

use crate::row::{RowField, RowId};

/// Error returned by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// Request could not be sent or the connection failed.
    #[error("network error: {0}")]
    Network(String),

    /// The requested client, device or manufacturer does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The session is not allowed to read the resource.
    #[error("not authorized to read {resource}")]
    Unauthorized { resource: String },

    /// The response body did not match the expected shape.
    #[error("invalid response for {resource}: {reason}")]
    InvalidResponse { resource: String, reason: String },
}

impl LookupError {
    /// Returns a user-friendly error message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Could not reach the catalog. Options may be incomplete.",
            Self::NotFound { .. } => "The requested catalog entry no longer exists.",
            Self::Unauthorized { .. } => "Your session is not allowed to read the catalog.",
            Self::InvalidResponse { .. } => "The catalog returned an unexpected response.",
        }
    }

    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Error returned by entry form operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("row {0} does not exist")]
    UnknownRow(RowId),

    /// The value is not among the field's current options.
    #[error("{value:?} is not an available {field:?} on row {row}")]
    NotOffered {
        row: RowId,
        field: RowField,
        value: String,
    },
}

/// Result type alias for entry form operations.
pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(LookupError::Network("reset".to_string()).is_retryable());
        assert!(
            !LookupError::NotFound {
                resource: "device 4".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_display() {
        let err = LookupError::InvalidResponse {
            resource: "devices".to_string(),
            reason: "expected array".to_string(),
        };
        assert_eq!(err.to_string(), "invalid response for devices: expected array");
        assert_eq!(FormError::UnknownRow(RowId(3)).to_string(), "row 3 does not exist");
    }
}

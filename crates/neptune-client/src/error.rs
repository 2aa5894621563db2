//! Error types for the HTTP client.

use neptune_catalog::LookupError;
use neptune_session::AuthApiError;
use thiserror::Error;

/// Errors raised while talking to the Neptune server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Invalid base URL or client construction failure.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Network request failed.
    #[error("network error: {0}")]
    Network(String),

    /// The server refused the request and explained why.
    #[error("request rejected: {detail}")]
    Rejected { detail: String },

    /// 401 or 403, with the server's `detail` when it sent one.
    #[error("not authorized")]
    Unauthorized(Option<String>),

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("server error ({status}): {body}")]
    Http { status: u16, body: String },

    /// Failed to parse JSON response.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

impl ClientError {
    /// Returns a user-friendly error message suitable for display.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidConfig(_) => "The server address in the settings is not valid.",
            Self::Network(_) => {
                "Could not connect to the server. Please check your connection and try again."
            }
            Self::Rejected { detail } => detail.as_str(),
            Self::Unauthorized(_) => "Your session has expired. Please log in again.",
            Self::NotFound(_) => "The requested record does not exist.",
            Self::Http { .. } | Self::JsonParse(_) => "The server returned an unexpected response.",
        }
    }

    /// Returns whether this error is potentially recoverable with a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map to the session crate's login/logout error.
    pub fn into_auth_error(self) -> AuthApiError {
        match self {
            Self::Rejected { detail } | Self::Unauthorized(Some(detail)) => {
                AuthApiError::Rejected { detail }
            }
            Self::Unauthorized(None) => AuthApiError::Rejected {
                detail: "Invalid credentials".to_string(),
            },
            other => AuthApiError::Network(other.to_string()),
        }
    }

    /// Map to the catalog crate's lookup error for `resource`.
    pub fn into_lookup_error(self, resource: &str) -> LookupError {
        match self {
            Self::NotFound(_) => LookupError::NotFound {
                resource: resource.to_string(),
            },
            Self::Unauthorized(_) => LookupError::Unauthorized {
                resource: resource.to_string(),
            },
            Self::JsonParse(reason) => LookupError::InvalidResponse {
                resource: resource.to_string(),
                reason,
            },
            Self::Rejected { detail } => LookupError::InvalidResponse {
                resource: resource.to_string(),
                reason: detail,
            },
            other => LookupError::Network(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::JsonParse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

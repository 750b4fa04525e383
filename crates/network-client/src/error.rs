//! Network client errors

use thiserror::Error;

/// Errors that can occur when interacting with the network resource provider
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request
    #[error("provider error {status} ({code}): {message}")]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Provider error code (e.g. `InvalidRequestFormat`)
        code: String,
        /// Provider supplied diagnostic message
        message: String,
    },

    /// A long-running operation reached a failed terminal state
    #[error("operation failed ({code}): {message}")]
    OperationFailed {
        /// Provider error code
        code: String,
        /// Provider supplied diagnostic message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid token, expired, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl NetworkError {
    /// Whether this error means the addressed object does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            NetworkError::NotFound(_) => true,
            NetworkError::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Provider diagnostic text, used when matching well-known rejections
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            NetworkError::Api { message, .. } | NetworkError::OperationFailed { message, .. } => {
                Some(message)
            }
            _ => None,
        }
    }
}

//! Error types for the backend and card data clients

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service rejected the credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credentials are valid but not allowed to do this
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Server error: {status} - {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The response was well-formed but not what was asked for
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The client is missing something it needs for this call
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Classify a non-success status and its body
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

//! Error type for the HTTP handlers
//!
//! Every error leaves the service as `{ "error": "<message>" }`. Server-side
//! failures are logged in full and answered with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use commander_ledger_client::ClientError;
use commander_ledger_core::CoreError;
use serde_json::json;
use thiserror::Error;

/// Error returned by handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// The caller may not touch this resource
    #[error("{0}")]
    Forbidden(String),

    /// The resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Malformed request
    #[error("{0}")]
    BadRequest(String),

    /// A feature the request needs is not configured
    #[error("{0}")]
    ServiceUnavailable(String),

    /// The hosted backend or card API failed
    #[error("backend error: {0}")]
    Backend(#[from] ClientError),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Status code the error is answered with
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Backend(ClientError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Backend(ClientError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Backend(ClientError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Backend(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Not found error for a kind of resource
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => ApiError::BadRequest(message),
            CoreError::Config(message) => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            match &self {
                ApiError::Backend(ClientError::Unauthorized(_)) => "unauthorized".to_string(),
                ApiError::Backend(ClientError::Forbidden(_)) => "forbidden".to_string(),
                ApiError::Backend(ClientError::NotFound(_)) => "not found".to_string(),
                other => other.to_string(),
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

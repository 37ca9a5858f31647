//! Error types for the core crate
//!
//! Core functions are mostly total; errors only come out of payload
//! validation and configuration checks.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A payload failed validation before being sent to the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/**
 * Backend Error Types
 *
 * This module defines error types specific to the chat server.
 * These errors are returned from HTTP handlers and converted to JSON
 * responses.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised while decoding a request:
 * - Missing or malformed query parameters
 * - Unparseable form bodies
 *
 * ## Broker Errors
 *
 * Wrapped from the broker:
 * - `InvalidArgument` becomes 400 Bad Request
 * - `Internal` becomes 500 Internal Server Error
 *
 * ## Unavailable
 *
 * A long-poll that was aborted because the server is shutting down
 * is reported as 503 Service Unavailable.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::broker::BrokerError;
use crate::shared::{ConfigError, SharedError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use microchat::backend::error::BackendError;
///
/// let err = BackendError::bad_request("timeout must be a number");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
///
/// let err = BackendError::unavailable("server is shutting down");
/// assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., invalid query parameter)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The server cannot serve the request right now
    #[error("Service unavailable: {message}")]
    Unavailable {
        /// Human-readable error message
        message: String,
    },

    /// Chat post validation error
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Broker rejected or failed the call
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Invalid server configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    ///
    /// # Arguments
    ///
    /// * `status` - HTTP status code
    /// * `message` - Error message
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 400 handler error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Unavailable` - 503 Service Unavailable
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `Broker` - 400 for invalid arguments, 500 otherwise
    /// - `Config` - 500 Internal Server Error
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Broker(err) => match err {
                BrokerError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
                BrokerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unavailable { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::Broker(err) => err.to_string(),
            Self::Config(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}

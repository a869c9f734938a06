//! Broker error types.

use thiserror::Error;

/// Result alias used throughout the broker.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors reported synchronously to broker callers.
///
/// A subscribe that times out is not an error; it resolves with
/// [`SubscribeResponse::Timeout`](super::SubscribeResponse::Timeout).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Rejected before any state was touched
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        /// The argument that was rejected
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The broker could not serve the call; other topics stay usable
    #[error("Internal broker error: {message}")]
    Internal {
        /// Human-readable reason
        message: String,
    },
}

impl BrokerError {
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

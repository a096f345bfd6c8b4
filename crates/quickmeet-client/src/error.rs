//! Client error types.

use quickmeet_core::ValidationError;
use quickmeet_providers::ProviderError;
use quickmeet_server::ServerError;
use serde_json::Value;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request failed client-side validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The server answered with an error.
    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// The server could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server answered with something unexpected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Provider error (interactive authorization).
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The embedded server failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Action failed (open, copy).
    #[error("action failed: {0}")]
    Action(String),
}

impl ClientError {
    /// Vendor or parser detail attached by the server, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

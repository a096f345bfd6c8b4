//! Server error types.

use std::io;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quickmeet_core::ValidationError;
use quickmeet_protocol::ErrorBody;
use quickmeet_providers::{ErrorCategory, ProviderError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error while serving.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The listener could not be bound.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The provider could not be built.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a bind error.
    pub fn bind(addr: impl Into<String>, source: io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}

/// Message returned when the request body cannot be parsed.
pub const INVALID_BODY: &str = "Invalid request body";

/// A failed API call, rendered as an [`ErrorBody`].
#[derive(Debug)]
pub enum ApiError {
    /// The request failed validation.
    Validation(ValidationError),
    /// The body was not valid JSON for the endpoint.
    InvalidBody(String),
    /// The provider failed.
    Provider(ProviderError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Provider(err) if err.category() == ErrorCategory::Validation => {
                StatusCode::BAD_REQUEST
            }
            Self::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body for this error.
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(err) => ErrorBody::new(err.to_string()),
            Self::InvalidBody(details) => {
                ErrorBody::new(INVALID_BODY).with_details(Value::String(details.clone()))
            }
            Self::Provider(err) => {
                let body = ErrorBody::new(err.message());
                match err.details() {
                    Some(details) if err.category() != ErrorCategory::Validation => {
                        body.with_details(details.clone())
                    }
                    _ => body,
                }
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                Self::Provider(err) => error!(
                    code = err.code().as_str(),
                    provider = err.provider().unwrap_or("-"),
                    "request failed: {}",
                    err.message()
                ),
                other => error!("request failed: {other:?}"),
            }
        } else {
            debug!(status = status.as_u16(), "rejected request: {:?}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

//! Error types for meeting provider operations.
//!
//! Every failure of the meeting service is a [`ProviderError`]. Its
//! [`ProviderErrorCode`] says what happened; [`ErrorCategory`] groups codes
//! into the three kinds callers act on: bad input, credential trouble and
//! vendor failures.

use std::fmt;

use quickmeet_core::ValidationError;
use serde_json::Value;
use thiserror::Error;

/// Coarse grouping of error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request itself is wrong; the user can fix it.
    Validation,
    /// Credentials are missing, misconfigured or need consent; the operator
    /// can fix it.
    Auth,
    /// The vendor API failed or rejected the call.
    Upstream,
    /// Unexpected state.
    Internal,
}

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The scheduling request failed validation.
    Validation,
    /// No usable credential: consent required or refresh rejected.
    AuthenticationFailed,
    /// Configuration error - missing or invalid client-secret file, bad paths.
    ConfigurationError,
    /// The vendor refused the access token or the operation (401/403).
    AuthorizationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Rate limit exceeded - too many requests.
    RateLimited,
    /// Server returned an error (5xx status codes).
    ServerError,
    /// Request was invalid (400) - bad parameters, malformed request.
    BadRequest,
    /// Resource not found (404), e.g. an unknown calendar id.
    NotFound,
    /// Invalid response from the server - parse error, unexpected format.
    InvalidResponse,
    /// Internal provider error - unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns the category this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation => ErrorCategory::Validation,
            Self::AuthenticationFailed | Self::ConfigurationError => ErrorCategory::Auth,
            Self::AuthorizationFailed
            | Self::NetworkError
            | Self::RateLimited
            | Self::ServerError
            | Self::BadRequest
            | Self::NotFound
            | Self::InvalidResponse => ErrorCategory::Upstream,
            Self::InternalError => ErrorCategory::Internal,
        }
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::AuthenticationFailed => "authentication_failed",
            Self::ConfigurationError => "configuration_error",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::InvalidResponse => "invalid_response",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while scheduling or creating a meeting.
#[derive(Debug, Error)]
pub struct ProviderError {
    /// The error code categorizing this error.
    code: ProviderErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The provider that generated this error (e.g., "google").
    provider: Option<String>,
    /// Vendor error payload, surfaced to API callers.
    details: Option<Value>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            details: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attaches the vendor's error payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error category.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns the vendor error payload, if any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Returns a copy without the source chain.
    ///
    /// Used where an error is reported more than once, since boxed sources
    /// cannot be cloned.
    pub fn detached(&self) -> Self {
        Self {
            code: self.code,
            message: self.message.clone(),
            provider: self.provider.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<ValidationError> for ProviderError {
    fn from(err: ValidationError) -> Self {
        Self::new(ProviderErrorCode::Validation, err.to_string()).with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

//! Error types for the client layer.

use serde::Deserialize;
use thiserror::Error;

/// Error response body returned by OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// The error detail object.
    pub error: ErrorDetail,
}

/// Detailed error information from the API.
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// The provider's error message.
    pub message: String,
}

/// Errors that can occur when talking to a model service.
///
/// None of these are retried; every transport failure propagates to
/// the session and ends it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP request failure (DNS, connect, socket, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON encoding or decoding failure on the wire.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The API rejected the credentials (HTTP 401).
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Too many requests (HTTP 429).
    #[error("rate limit exceeded: {0}")]
    RateLimit(String),

    /// The provider's servers failed (HTTP 5xx).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other non-success status from the API.
    #[error("api error (status {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The provider's error message, or the raw body.
        message: String,
    },

    /// The API returned data that doesn't match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request is malformed or missing required parts.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The client configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Tools were requested but this client cannot send them.
    #[error("tool calling not supported")]
    ToolsNotSupported,

    /// Streaming was requested but this client is request/response only.
    #[error("streaming not supported")]
    StreamingNotSupported,
}

impl ClientError {
    /// Returns whether this error came from the authentication layer.
    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns whether this error is a rate limit rejection.
    #[must_use]
    pub const fn is_rate_limit_error(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }
}

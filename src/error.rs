//! Error types for the fetch layer
//!
//! Provides unified error handling using thiserror. The taxonomy is flat:
//! a single attempt fails with a [`FetchError`], the retry executor
//! synthesizes a [`RequestFailed`] once it gives up, and the pipeline turns
//! that into a user-facing [`ApiError`].

use serde_json::Value;
use thiserror::Error;

use crate::client::ErrorCategory;

/// Stable code carried by every [`RequestFailed`].
pub const REQUEST_FAILED_CODE: &str = "REQUEST_FAILED";

// == Transport Error ==
/// No response was received from the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport-level timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// DNS or connection failure
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The request could not be built (bad URL, unserializable body)
    #[error("Invalid request: {0}")]
    Setup(String),

    /// Any other transport failure, including aborted requests
    #[error("Network error: {0}")]
    Other(String),
}

// == Fetch Error ==
/// Failure of a single request attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// No response was received
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response was received with a non-2xx status
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: Option<Value> },

    /// The response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Rejected by the form/schema layer before reaching the network
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl FetchError {
    /// HTTP status of the failed attempt, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            FetchError::HttpStatus { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Message supplied by the server in the response body.
    ///
    /// Looks at the `message` field first, then `error`, then accepts a bare
    /// JSON string body.
    pub fn server_message(&self) -> Option<String> {
        let body = self.payload()?;
        ["message", "error"]
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str))
            .or_else(|| body.as_str())
            .filter(|msg| !msg.is_empty())
            .map(str::to_string)
    }
}

// == Request Failed ==
/// Synthesized by the retry executor once a request has definitively failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RequestFailed {
    /// Server-provided message if present, else the attempt error message
    pub message: String,
    /// Always [`REQUEST_FAILED_CODE`]
    pub code: &'static str,
    /// Last HTTP status observed, 0 if no response was ever received
    pub status: u16,
    /// Raw response payload of the last attempt
    pub payload: Option<Value>,
    /// Number of times the request function was invoked
    pub attempts: u32,
    /// The last attempt's error
    #[source]
    pub source: FetchError,
}

impl RequestFailed {
    /// Builds the terminal error from the last attempt's failure.
    pub fn from_attempt(source: FetchError, attempts: u32) -> Self {
        let message = source
            .server_message()
            .unwrap_or_else(|| source.to_string());

        Self {
            message,
            code: REQUEST_FAILED_CODE,
            status: source.status().unwrap_or(0),
            payload: source.payload().cloned(),
            attempts,
            source,
        }
    }
}

// == API Error ==
/// Error surfaced to callers of the fetch layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// A classified request failure
    #[error("{title}: {message}")]
    Request {
        category: ErrorCategory,
        title: String,
        message: String,
        status: u16,
        payload: Option<Value>,
        attempts: u32,
    },

    /// Validation failure passed through unmodified
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl ApiError {
    /// Error category, `None` for validation errors.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ApiError::Request { category, .. } => Some(*category),
            ApiError::Validation(_) => None,
        }
    }

    /// Message shown to the user, the same one written to the error state.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Request { message, .. } => message,
            ApiError::Validation(message) => message,
        }
    }

    /// HTTP status of the failed request, 0 when none was received.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Request { status, .. } => *status,
            ApiError::Validation(_) => 0,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the fetch layer.
pub type Result<T> = std::result::Result<T, ApiError>;

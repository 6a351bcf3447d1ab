//! Error types for the Boon AI SDK
//!
//! This module defines the error hierarchy for the entire SDK.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Failure statuses from the API server are decoded into an [`ErrorPayload`]
//! and mapped onto one typed variant per status class.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Structured error payload returned by the API server.
///
/// Decoded from the JSON error body when possible. When the body is not
/// valid JSON (HTML error pages, proxy output) a payload is synthesized
/// so every status error still carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    /// Human readable description of the failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Server-side exception class name, when the server reports one.
    #[serde(default)]
    pub exception: Option<String>,
    /// Underlying cause reported by the server.
    #[serde(default)]
    pub cause: Option<String>,
    /// Endpoint path the failure occurred on.
    #[serde(default)]
    pub path: Option<String>,
    /// Numeric HTTP status of the response.
    #[serde(default)]
    pub status: Option<u16>,
}

impl ErrorPayload {
    /// The failure message, falling back to a generic one when the server
    /// sent none.
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown request exception")
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The main error type for the Boon AI SDK
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Credential Errors
    // ============================================================================
    /// No API key was configured; raised before any network activity
    #[error("No API key is configured, cannot make request")]
    MissingApiKey,

    /// An API key source could not be decoded
    #[error("Invalid API key: {message}")]
    InvalidApiKey {
        /// What made the key unusable
        message: String,
    },

    /// Signing the request token failed
    #[error("Failed to sign request token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    /// Socket-level failure reaching the server; the only retryable error
    #[error("Connection to the API server failed: {0}")]
    Connection(#[source] reqwest::Error),

    /// Any other failure inside the HTTP client
    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    /// The configured server URL does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Reading a local file for upload failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // API Status Errors
    // ============================================================================
    /// The server answered 404
    #[error("Entity not found: {0}")]
    NotFound(ErrorPayload),

    /// The server answered 409
    #[error("Duplicate entity: {0}")]
    Duplicate(ErrorPayload),

    /// The server answered 400 or 500
    #[error("Invalid request: {0}")]
    InvalidRequest(ErrorPayload),

    /// The server answered 401 or 403
    #[error("Security error: {0}")]
    Security(ErrorPayload),

    /// The server answered any other failure status
    #[error("Request failed: {0}")]
    Request(ErrorPayload),

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    /// A body or value did not decode as the expected JSON shape
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid API key error
    pub fn invalid_api_key(message: impl Into<String>) -> Self {
        Self::InvalidApiKey {
            message: message.into(),
        }
    }

    /// Wrap a socket-level failure from the HTTP client
    pub fn connection(err: reqwest::Error) -> Self {
        Self::Connection(err)
    }

    /// Wrap a non-connection failure from the HTTP client
    pub fn http(err: reqwest::Error) -> Self {
        Self::Http(err)
    }

    /// The server payload, for API status errors
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            Error::NotFound(p)
            | Error::Duplicate(p)
            | Error::InvalidRequest(p)
            | Error::Security(p)
            | Error::Request(p) => Some(p),
            _ => None,
        }
    }

    /// The HTTP status that produced this error, for API status errors
    pub fn status(&self) -> Option<u16> {
        self.payload().and_then(|p| p.status)
    }

    /// The endpoint path the failure occurred on, for API status errors
    pub fn endpoint(&self) -> Option<&str> {
        self.payload().and_then(|p| p.path.as_deref())
    }

    /// The server-side exception class name, when reported
    pub fn exception_type(&self) -> Option<&str> {
        self.payload().and_then(|p| p.exception.as_deref())
    }

    /// Check if this error is retryable
    ///
    /// Only socket-level connection failures are. A response from the
    /// server, whatever its status, is never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Decode an error response body and map its status onto one typed error.
///
/// The body is parsed as a JSON payload object; anything else gets a
/// synthesized payload recording the status and the parse failure. The
/// request path fills in `path` when the server omitted it.
pub(crate) fn from_response(status: u16, body: &[u8], endpoint: &str) -> Error {
    let mut payload = serde_json::from_slice::<ErrorPayload>(body).unwrap_or_else(|err| {
        ErrorPayload {
            message: Some(format!(
                "HTTP request failed with status '{status}', response not JSON formatted: {err}"
            )),
            ..ErrorPayload::default()
        }
    });
    if payload.status.is_none() {
        payload.status = Some(status);
    }
    if payload.path.is_none() {
        payload.path = Some(endpoint.to_string());
    }
    translate_status(status, payload)
}

/// Map an HTTP failure status onto its typed error.
pub(crate) fn translate_status(status: u16, payload: ErrorPayload) -> Error {
    match status {
        404 => Error::NotFound(payload),
        409 => Error::Duplicate(payload),
        400 | 500 => Error::InvalidRequest(payload),
        401 | 403 => Error::Security(payload),
        _ => Error::Request(payload),
    }
}

/// Result type alias for the Boon AI SDK
pub type Result<T> = std::result::Result<T, Error>;

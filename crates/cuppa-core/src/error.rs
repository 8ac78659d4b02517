//! Error types for the cuppa client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, decoding, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for cuppa operations.
///
/// This error type covers all possible failure modes in the client,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (expired session, failed token refresh).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The API answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A successful response body did not match the expected shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Input validation errors (invalid URL, timestamp, response contract).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The refresh token itself has expired; the user must log in again.
    #[error("refresh token expired, please login again")]
    SessionExpired,

    /// A preflight token refresh was rejected or unreachable.
    #[error("failed to refresh token: {source}")]
    RefreshFailed { source: Box<Error> },
}

/// A non-success response from the API, after all retry logic.
///
/// The message is extracted from the response body by the error decoder
/// (field errors, then meta message, then detail, then raw body).
#[derive(Debug)]
pub struct ApiError {
    status: u16,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code of the failing response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The decoded error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Errors turning a response body into a typed value, or a request body
/// into bytes. A decode failure on a 2xx response indicates a contract
/// mismatch with the backend, not a user-facing transient condition.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A payload was expected but the response body was empty.
    #[error("response body was empty")]
    EmptyBody,

    /// JSON (de)serialization failed.
    #[error("failed to decode response: {message}")]
    Json { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A token expiry timestamp that is neither epoch milliseconds nor
    /// RFC 3339.
    #[error("invalid timestamp '{value}'")]
    Timestamp { value: String },

    /// A response payload violated the API contract.
    #[error("{message}")]
    Response { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_message_only() {
        let err = ApiError::new(400, "password: too short");
        assert_eq!(err.to_string(), "password: too short");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn session_expired_message() {
        let err = Error::Auth(AuthError::SessionExpired);
        assert_eq!(err.to_string(), "refresh token expired, please login again");
    }

    #[test]
    fn refresh_failed_wraps_source() {
        let source = Error::Transport(TransportError::Timeout);
        let err = AuthError::RefreshFailed {
            source: Box::new(source),
        };
        assert!(err.to_string().contains("failed to refresh token"));
        assert!(err.to_string().contains("timed out"));
    }
}

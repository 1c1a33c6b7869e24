//! Error types for the booking API client

use std::time::Duration;

use thiserror::Error;

/// Login failed (bad credentials, upstream error, or network failure)
///
/// Cloneable so that one failed login attempt can be reported to every
/// caller that was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Authentication failed: {message}")]
pub struct AuthenticationError {
    pub message: String,
}

impl AuthenticationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur when calling the booking API
#[derive(Debug, Error)]
pub enum ClientError {
    /// A token could not be obtained
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// The upstream rejected the token again after re-authenticating
    #[error("Authorization rejected after re-authentication: {body}")]
    Authorization { body: String },

    /// Any other non-2xx response
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The body held no parseable JSON, or JSON of the wrong shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request body could not be serialized; nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ClientError {
    /// Upstream HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Authorization { .. } => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout(_))
    }
}

/// Failure reported by a [`super::Transport`] before any response arrived
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Network(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(after) => ClientError::Timeout(after),
            TransportError::Network(message) => ClientError::Network(message),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

//! Client error types

use shared::ErrorClass;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Session rejected by the server (401); the local token has already
    /// been invalidated by the time this surfaces
    #[error("Authentication required")]
    Unauthorized,

    /// Input rejected by the server (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure (>=500)
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-2xx status
    #[error("Unexpected status {status}: {message}")]
    Unexpected { status: u16, message: String },

    /// Session storage failure
    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Unauthorized => Some(401),
            Self::Validation(_) => Some(400),
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } | Self::Unexpected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Total classification into the console's failure classes
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Http(_) => ErrorClass::Network,
            Self::Unauthorized => ErrorClass::Auth,
            Self::Validation(_) => ErrorClass::Validation,
            Self::NotFound(_) => ErrorClass::NotFound,
            Self::Server { .. } => ErrorClass::Server,
            Self::Unexpected { status, .. } => ErrorClass::from_status(*status),
            Self::InvalidResponse(_) | Self::Session(_) | Self::Serialization(_) => {
                ErrorClass::Unknown
            }
        }
    }

    /// Server-supplied message, when one arrived with the failure
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Validation(m) | Self::NotFound(m) => {
                (!m.is_empty()).then_some(m.as_str())
            }
            Self::Server { message, .. } | Self::Unexpected { message, .. } => {
                (!message.is_empty()).then_some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

//! Wire-level error payload

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the admin API on non-2xx responses
///
/// The server is only guaranteed to send `message` for validation errors;
/// everything else may arrive as an empty body, so the status code is the
/// authoritative signal.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("api error {status}: {}", message.as_deref().unwrap_or("<no message>"))]
pub struct ApiError {
    /// Defaults to 0 when parsed from a body that omits it; the transport
    /// layer fills it in from the response status
    #[serde(default)]
    pub status: u16,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: None,
        }
    }

    pub fn with_message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    /// HTTP status as a typed code, if valid
    pub fn status_code(&self) -> Option<http::StatusCode> {
        http::StatusCode::from_u16(self.status).ok()
    }
}

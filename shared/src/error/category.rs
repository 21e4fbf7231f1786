//! Failure classification

use serde::{Deserialize, Serialize};

/// Failure class for anything surfacing from the remote layer or a panel
///
/// Classification is total: every failure maps to exactly one class.
/// Transport failures are `Network`; HTTP failures classify by status:
/// - 401: `Auth`
/// - 400: `Validation`
/// - 404: `NotFound`
/// - 500 and above: `Server`
/// - anything else: `Unknown`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Transport or connectivity failure, no HTTP status available
    Network,
    /// Session rejected by the server (401)
    Auth,
    /// Input rejected by the server (400)
    Validation,
    /// Requested resource does not exist (404)
    NotFound,
    /// Server-side failure (>=500)
    Server,
    /// Everything else
    Unknown,
}

impl ErrorClass {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Auth,
            400 => Self::Validation,
            404 => Self::NotFound,
            500.. => Self::Server,
            _ => Self::Unknown,
        }
    }

    /// Get the string name for this class
    pub fn name(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::Unknown => "unknown",
        }
    }
}

//! Console error type

use lottery_client::ClientError;
use shared::ErrorClass;
use thiserror::Error;

/// Error type for console operations
#[derive(Debug, Error)]
pub enum AdminError {
    /// Failure surfaced from the remote access layer
    #[error(transparent)]
    Api(#[from] ClientError),

    /// Navigation target outside the closed panel set
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// Department write that would close a parent cycle
    #[error("Department parent cycle: {0}")]
    DepartmentCycle(String),
}

impl AdminError {
    /// Total classification into the console's failure classes
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Api(e) => e.class(),
            Self::UnknownComponent(_) => ErrorClass::Unknown,
            Self::DepartmentCycle(_) => ErrorClass::Validation,
        }
    }

    /// Server-supplied message to surface to the operator, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.server_message(),
            Self::DepartmentCycle(m) => Some(m.as_str()),
            Self::UnknownComponent(_) => None,
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        Self::Api(ClientError::Serialization(e))
    }
}

/// Result type for console operations
pub type AdminResult<T> = Result<T, AdminError>;

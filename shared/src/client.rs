//! Client-related types shared between server and console
//!
//! Request/response DTOs for the auth endpoints.

use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Remember-me extends the local session lifetime
    #[serde(default)]
    pub remember: bool,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: Option<String>,
    pub message: Option<String>,
}

/// Token check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCheckResponse {
    pub valid: bool,
}

/// Authenticated admin identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

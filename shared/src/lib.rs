//! Shared types for the lottery admin console
//!
//! Domain models, error taxonomy, auth DTOs and small utilities used by
//! both the remote access layer and the admin shell.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use client::{CurrentUser, LoginRequest, LoginResponse, TokenCheckResponse};
pub use error::{ApiError, ErrorClass};

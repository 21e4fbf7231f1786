//! Lottery Client - HTTP client for the admin API
//!
//! Provides authenticated network calls to the lottery server's REST API
//! and the persistent session token storage backing them.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;

pub use api::LotteryApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use session::SessionStore;

// Re-export shared types for convenience
pub use shared::client::{CurrentUser, LoginRequest, LoginResponse, TokenCheckResponse};

//! Data models
//!
//! Shared between the admin API and the console. Wire format is camelCase
//! JSON; IDs are server-assigned strings, so entities carry `Option<String>`
//! and create payloads carry none.

pub mod department;
pub mod prize;
pub mod record;
pub mod settings;
pub mod user;

// Re-exports
pub use department::*;
pub use prize::*;
pub use record::*;
pub use settings::*;
pub use user::*;

//! Error taxonomy shared between the remote layer and the admin shell

pub mod category;
pub mod types;

pub use category::ErrorClass;
pub use types::ApiError;

//! Failure reporting: classification plus one side effect per class
//!
//! The reporter is the single place user-visible failure behavior lives.
//! Classification is total, side effects are fire-and-forget, and the
//! reporter itself never fails.

use crate::error::AdminError;
use crate::ui::{AdminUi, MessageLevel};
use shared::ErrorClass;
use std::sync::Arc;

/// Classifies failures and applies the associated side effect
pub struct ErrorReporter {
    ui: Arc<dyn AdminUi>,
}

impl ErrorReporter {
    pub fn new(ui: Arc<dyn AdminUi>) -> Self {
        Self { ui }
    }

    /// Classify `error` and apply its side effect.
    ///
    /// Auth failures redirect to the login page (the session token was
    /// already invalidated by the remote layer); every other class shows a
    /// toast. The redirect is issued here and nowhere else, so it fires
    /// exactly once per failure.
    pub fn handle(&self, error: &AdminError) -> ErrorClass {
        let class = error.class();
        tracing::error!(class = class.name(), %error, "error caught by reporter");

        match class {
            ErrorClass::Network => {
                self.ui.show_message(
                    MessageLevel::Error,
                    "Network connection failed, check your connection",
                );
            }
            ErrorClass::Auth => {
                self.ui.redirect_to_login();
            }
            ErrorClass::Validation => {
                let text = error.server_message().unwrap_or("Invalid input");
                self.ui.show_message(MessageLevel::Error, text);
            }
            ErrorClass::NotFound => {
                self.ui
                    .show_message(MessageLevel::Error, "The requested resource does not exist");
            }
            ErrorClass::Server => {
                self.ui
                    .show_message(MessageLevel::Error, "Server error, try again later");
            }
            ErrorClass::Unknown => {
                self.ui
                    .show_message(MessageLevel::Error, "Operation failed, please retry");
            }
        }

        class
    }
}

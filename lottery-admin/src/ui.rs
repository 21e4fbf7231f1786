//! UI sink boundary
//!
//! Everything browser-shaped the core needs to touch goes through this
//! trait: content injection, toasts, top-bar visibility, the login
//! redirect, and the preview window. The shell provides the real
//! implementation; tests record calls.

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Error,
}

/// Which top-bar actions are visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolbarVisibility {
    pub save: bool,
    pub preview: bool,
}

impl ToolbarVisibility {
    /// Both actions hidden (no active panel, or a failed load)
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// Shell-provided rendering and notification surface
pub trait AdminUi: Send + Sync {
    /// Replace the content region entirely
    fn set_content(&self, html: &str);

    /// Replace one section inside the injected fragment (table bodies,
    /// filter selects)
    fn update_section(&self, section_id: &str, html: &str);

    /// Transient toast notification
    fn show_message(&self, level: MessageLevel, text: &str);

    /// Adjust top-bar action visibility
    fn set_toolbar(&self, toolbar: ToolbarVisibility);

    /// Abandon the page for the login screen
    fn redirect_to_login(&self);

    /// Open the lottery preview page
    fn open_preview(&self);
}

/// UI sink that drops everything; for headless use
#[derive(Debug, Default)]
pub struct NullUi;

impl AdminUi for NullUi {
    fn set_content(&self, _html: &str) {}
    fn update_section(&self, _section_id: &str, _html: &str) {}
    fn show_message(&self, _level: MessageLevel, _text: &str) {}
    fn set_toolbar(&self, _toolbar: ToolbarVisibility) {}
    fn redirect_to_login(&self) {}
    fn open_preview(&self) {}
}

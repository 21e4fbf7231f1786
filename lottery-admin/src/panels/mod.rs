//! Panel modules
//!
//! Each panel independently fetches its data slice, renders it through the
//! UI sink, and implements the lifecycle capability contract.

pub mod prize_manage;
pub mod settings;
pub mod user_manage;

pub use prize_manage::{PrizeManagePanel, init_prize_manage};
pub use settings::{SettingsPanel, init_settings};
pub use user_manage::{UserManagePanel, init_user_manage};

/// Minimal HTML escaping for values interpolated into markup
pub(crate) fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

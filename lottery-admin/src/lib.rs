//! Lottery admin console core
//!
//! The state/coordination layer behind the admin dashboard: a
//! publish-subscribe state container ([`Store`]), a panel lifecycle manager
//! ([`LifecycleManager`]) hosting the prize/participant/settings panels
//! behind a uniform capability contract, and an error reporter applying one
//! side effect per failure class.
//!
//! The DOM and everything browser-shaped sits behind the [`AdminUi`] sink
//! trait; the remote API sits behind `lottery_client::LotteryApi`. Both are
//! injected, never global.

pub mod error;
pub mod lifecycle;
pub mod panels;
pub mod reporter;
pub mod store;
pub mod ui;

pub use error::{AdminError, AdminResult};
pub use lifecycle::{
    Capabilities, LifecycleManager, Panel, PanelContext, PanelKind, PanelRegistry,
};
pub use reporter::ErrorReporter;
pub use store::{StatePatch, StateSnapshot, Store, StoreFailure, SubscriptionId};
pub use ui::{AdminUi, MessageLevel, NullUi, ToolbarVisibility};

// Re-exports for downstream convenience
pub use lottery_client::{ClientConfig, ClientError, HttpClient, LotteryApi, SessionStore};
pub use shared::ErrorClass;

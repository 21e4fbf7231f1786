// lottery-admin/examples/admin_shell.rs
// Headless admin shell against a running lottery server

use lottery_admin::{
    AdminUi, ClientConfig, HttpClient, LifecycleManager, MessageLevel, PanelContext,
    PanelRegistry, SessionStore, Store, ToolbarVisibility,
};
use std::sync::Arc;

/// UI sink that narrates everything through tracing instead of a DOM
struct LogUi;

impl AdminUi for LogUi {
    fn set_content(&self, html: &str) {
        tracing::info!(bytes = html.len(), "content region replaced");
    }
    fn update_section(&self, section_id: &str, html: &str) {
        tracing::info!(section_id, bytes = html.len(), "section updated");
    }
    fn show_message(&self, level: MessageLevel, text: &str) {
        match level {
            MessageLevel::Error => tracing::warn!(text, "toast"),
            _ => tracing::info!(text, "toast"),
        }
    }
    fn set_toolbar(&self, toolbar: ToolbarVisibility) {
        tracing::info!(save = toolbar.save, preview = toolbar.preview, "toolbar");
    }
    fn redirect_to_login(&self) {
        tracing::warn!("redirect to login");
    }
    fn open_preview(&self) {
        tracing::info!("preview window opened");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: {} <username> <password>", args[0]);
        println!("  Example: {} admin admin123", args[0]);
        return Ok(());
    }
    let username = &args[1];
    let password = &args[2];

    let base_url =
        std::env::var("LOTTERY_SERVER_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let session_path =
        std::env::var("LOTTERY_SESSION_PATH").unwrap_or_else(|_| "session.json".to_string());

    let session = Arc::new(SessionStore::open(&session_path));
    let client = Arc::new(HttpClient::new(
        &ClientConfig::new(&base_url).with_session_path(&session_path),
        session.clone(),
    )?);

    // Reuse a remembered session when one is still valid
    if session.token().is_none() {
        let response = client.login(username, password, true).await?;
        if !response.success {
            tracing::error!(message = ?response.message, "login rejected");
            anyhow::bail!("login failed");
        }
    }
    tracing::info!(base_url, "session established");

    let store = Arc::new(Store::new(client.clone()));
    store.init().await?;

    let snapshot = store.snapshot();
    tracing::info!(
        prizes = snapshot.prizes.len(),
        users = snapshot.users.len(),
        departments = snapshot.departments.len(),
        "store initialized"
    );

    let manager = LifecycleManager::new(
        PanelContext {
            api: client,
            store,
            ui: Arc::new(LogUi),
        },
        PanelRegistry::with_default_panels(),
    );

    // Walk every panel the way the sidebar would
    for name in ["prize-manage", "user-manage", "settings"] {
        manager.load_component(name).await;
        manager.refresh().await;
    }

    Ok(())
}

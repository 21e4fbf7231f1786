//! Panel lifecycle
//!
//! The lifecycle manager owns the single active admin panel. Navigation
//! tears the outgoing panel down, injects the incoming panel's markup
//! fragment, runs its async factory, and installs the result, unless a
//! newer navigation started meanwhile, in which case the stale result is
//! destroyed and discarded. Top-bar commands are forwarded to the active
//! panel only when it declares the capability; absent capabilities no-op.

use crate::error::{AdminError, AdminResult};
use crate::reporter::ErrorReporter;
use crate::store::Store;
use crate::ui::{AdminUi, ToolbarVisibility};
use async_trait::async_trait;
use lottery_client::LotteryApi;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The closed set of admin panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    PrizeManage,
    UserManage,
    Settings,
}

impl PanelKind {
    /// Resolve a navigation name; anything outside the set is unknown
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "prize-manage" => Some(Self::PrizeManage),
            "user-manage" => Some(Self::UserManage),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PrizeManage => "prize-manage",
            Self::UserManage => "user-manage",
            Self::Settings => "settings",
        }
    }

    /// Static top-bar visibility table
    pub fn toolbar(&self) -> ToolbarVisibility {
        match self {
            Self::PrizeManage | Self::Settings => ToolbarVisibility {
                save: true,
                preview: true,
            },
            Self::UserManage => ToolbarVisibility {
                save: true,
                preview: false,
            },
        }
    }
}

/// Which optional lifecycle methods a panel implements.
///
/// `refresh` is required of every panel and has no flag here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub save: bool,
    pub preview: bool,
    pub destroy: bool,
}

/// Everything a panel factory needs, passed in at construction; no globals
#[derive(Clone)]
pub struct PanelContext {
    pub api: Arc<dyn LotteryApi>,
    pub store: Arc<Store>,
    pub ui: Arc<dyn AdminUi>,
}

/// Uniform panel contract
#[async_trait]
pub trait Panel: Send {
    fn kind(&self) -> PanelKind;

    /// Declared capability set; the manager only invokes declared methods
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Re-fetch this panel's data slice and re-render
    async fn refresh(&mut self) -> AdminResult<()>;

    async fn save(&mut self) -> AdminResult<()> {
        Ok(())
    }

    fn preview(&self) {}

    /// Release everything the panel holds outside the content region
    fn destroy(&mut self) {}
}

type PanelFuture = Pin<Box<dyn Future<Output = AdminResult<Box<dyn Panel>>> + Send>>;
type PanelFactory = Box<dyn Fn(PanelContext) -> PanelFuture + Send + Sync>;

/// Kind-to-factory dispatch table, registered at startup
#[derive(Default)]
pub struct PanelRegistry {
    factories: HashMap<PanelKind, PanelFactory>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the three built-in panels
    pub fn with_default_panels() -> Self {
        let mut registry = Self::new();
        registry.register(PanelKind::PrizeManage, crate::panels::init_prize_manage);
        registry.register(PanelKind::UserManage, crate::panels::init_user_manage);
        registry.register(PanelKind::Settings, crate::panels::init_settings);
        registry
    }

    pub fn register<F, Fut>(&mut self, kind: PanelKind, factory: F)
    where
        F: Fn(PanelContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AdminResult<Box<dyn Panel>>> + Send + 'static,
    {
        self.factories
            .insert(kind, Box::new(move |ctx| Box::pin(factory(ctx))));
    }

    fn get(&self, kind: PanelKind) -> Option<&PanelFactory> {
        self.factories.get(&kind)
    }
}

/// Hosts the active panel and mediates navigation and top-bar commands
pub struct LifecycleManager {
    ctx: PanelContext,
    registry: PanelRegistry,
    reporter: ErrorReporter,
    active: tokio::sync::Mutex<Option<Box<dyn Panel>>>,
    /// Navigation generation; a load whose generation is stale on
    /// completion is discarded instead of installed
    generation: AtomicU64,
}

impl LifecycleManager {
    pub fn new(ctx: PanelContext, registry: PanelRegistry) -> Self {
        let reporter = ErrorReporter::new(ctx.ui.clone());
        Self {
            ctx,
            registry,
            reporter,
            active: tokio::sync::Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Currently active panel kind, if any
    pub async fn active_kind(&self) -> Option<PanelKind> {
        self.active.lock().await.as_ref().map(|p| p.kind())
    }

    /// Swap the content region to `name`.
    ///
    /// Failures are fully contained here: the content region gets a retry
    /// affordance, the error goes through the reporter, and no panel is
    /// active afterwards. There is no caller above the shell to propagate
    /// to.
    pub async fn load_component(&self, name: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(component = name, generation, "loading component");

        // Dispose of the outgoing panel before anything else initializes
        self.take_and_destroy().await;

        let Some(kind) = PanelKind::from_name(name) else {
            let error = AdminError::UnknownComponent(name.to_string());
            self.render_retry(&error);
            self.reporter.handle(&error);
            return;
        };

        match self.load_inner(kind, generation).await {
            Ok(Some(panel)) => self.install(panel, kind, generation).await,
            Ok(None) => {}
            Err(error) => {
                if self.is_current(generation) {
                    self.render_retry(&error);
                }
                self.reporter.handle(&error);
            }
        }
    }

    /// Fetch and mount the panel's markup, then run its factory. Returns
    /// `None` when a newer navigation started during the fetch; the stale
    /// fragment never touches the content region and the factory is
    /// skipped.
    async fn load_inner(
        &self,
        kind: PanelKind,
        generation: u64,
    ) -> AdminResult<Option<Box<dyn Panel>>> {
        let fragment = self.ctx.api.fetch_fragment(kind.name()).await?;
        if !self.is_current(generation) {
            tracing::debug!(component = kind.name(), generation, "stale fetch discarded");
            return Ok(None);
        }
        self.ctx.ui.set_content(&fragment);

        let factory = self
            .registry
            .get(kind)
            .ok_or_else(|| AdminError::UnknownComponent(kind.name().to_string()))?;
        let panel = factory(self.ctx.clone()).await?;
        Ok(Some(panel))
    }

    async fn install(&self, panel: Box<dyn Panel>, kind: PanelKind, generation: u64) {
        let mut active = self.active.lock().await;
        if !self.is_current(generation) {
            drop(active);
            tracing::debug!(
                component = kind.name(),
                generation,
                "stale load discarded"
            );
            Self::destroy_panel(panel);
            return;
        }
        *active = Some(panel);
        drop(active);

        self.ctx.ui.set_toolbar(kind.toolbar());
        tracing::info!(component = kind.name(), "component active");
    }

    async fn take_and_destroy(&self) {
        if let Some(panel) = self.active.lock().await.take() {
            tracing::debug!(component = panel.kind().name(), "destroying outgoing panel");
            Self::destroy_panel(panel);
        }
        self.ctx.ui.set_toolbar(ToolbarVisibility::hidden());
    }

    fn destroy_panel(mut panel: Box<dyn Panel>) {
        if panel.capabilities().destroy {
            panel.destroy();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn render_retry(&self, error: &AdminError) {
        self.ctx.ui.set_content(&format!(
            "<div class=\"error-message\">\
             <h3>Load failed</h3>\
             <p>{error}</p>\
             <button class=\"retry-btn\">Retry</button>\
             </div>"
        ));
    }

    // ========== Top-bar command forwarding ==========
    //
    // The buttons do not know which panel is active; they forward blindly
    // and the manager no-ops when there is no panel or no capability.

    pub async fn save(&self) {
        let mut active = self.active.lock().await;
        let Some(panel) = active.as_mut() else { return };
        if !panel.capabilities().save {
            return;
        }
        if let Err(error) = panel.save().await {
            self.reporter.handle(&error);
        }
    }

    pub async fn preview(&self) {
        let active = self.active.lock().await;
        let Some(panel) = active.as_ref() else { return };
        if panel.capabilities().preview {
            panel.preview();
        }
    }

    pub async fn refresh(&self) {
        let mut active = self.active.lock().await;
        let Some(panel) = active.as_mut() else { return };
        if let Err(error) = panel.refresh().await {
            self.reporter.handle(&error);
        }
    }
}

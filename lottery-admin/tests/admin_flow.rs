//! End-to-end flows over an in-memory API double
//!
//! Exercises the store, lifecycle manager and reporter together the way
//! the shell drives them, with a recording UI sink standing in for the
//! browser.

use async_trait::async_trait;
use lottery_admin::panels::{init_prize_manage, init_settings, init_user_manage};
use lottery_admin::{
    AdminError, AdminResult, Capabilities, ErrorReporter, LifecycleManager, MessageLevel, Panel,
    PanelContext, PanelKind, PanelRegistry, StatePatch, Store, ToolbarVisibility,
};
use lottery_admin::{AdminUi, ClientError, ErrorClass, LotteryApi};
use lottery_client::ClientResult;
use shared::models::{
    Department, DepartmentCreate, DepartmentUpdate, LotteryRecord, LotteryRecordCreate, Prize,
    PrizeCreate, PrizeUpdate, Settings, User, UserCreate, UserUpdate,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ========== API double ==========

/// In-memory [`LotteryApi`] with injectable failures and per-fragment
/// delays for navigation races.
#[derive(Default)]
struct MockApi {
    prizes: Mutex<Vec<Prize>>,
    users: Mutex<Vec<User>>,
    departments: Mutex<Vec<Department>>,
    records: Mutex<Vec<LotteryRecord>>,
    settings: Mutex<Settings>,
    next_failure: Mutex<Option<ClientError>>,
    fragment_delays: Mutex<HashMap<String, Duration>>,
    next_id: Mutex<u64>,
}

impl MockApi {
    fn seeded(prizes: Vec<Prize>, users: Vec<User>, departments: Vec<Department>) -> Self {
        let api = Self::default();
        *api.prizes.lock().unwrap() = prizes;
        *api.users.lock().unwrap() = users;
        *api.departments.lock().unwrap() = departments;
        api
    }

    /// The next API call fails with `error` instead of executing
    fn fail_next(&self, error: ClientError) {
        *self.next_failure.lock().unwrap() = Some(error);
    }

    fn delay_fragment(&self, name: &str, delay: Duration) {
        self.fragment_delays
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    fn take_failure(&self) -> Option<ClientError> {
        self.next_failure.lock().unwrap().take()
    }

    fn assign_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("id-{next}")
    }
}

/// Status-shaped failure the transport layer would produce
fn err_from_status(status: u16) -> ClientError {
    match status {
        400 => ClientError::Validation("count must be positive".into()),
        401 => ClientError::Unauthorized,
        404 => ClientError::NotFound("no such prize".into()),
        s if s >= 500 => ClientError::Server {
            status: s,
            message: "boom".into(),
        },
        s => ClientError::Unexpected {
            status: s,
            message: String::new(),
        },
    }
}

/// Transport-level failure without touching the network: reqwest rejects
/// the scheme at send time
async fn network_error() -> ClientError {
    let err = reqwest::Client::new()
        .get("ftp://localhost/")
        .send()
        .await
        .expect_err("ftp scheme must be rejected");
    ClientError::Http(err)
}

#[async_trait]
impl LotteryApi for MockApi {
    async fn list_prizes(&self) -> ClientResult<Vec<Prize>> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.prizes.lock().unwrap().clone())
    }

    async fn create_prize(&self, prize: &PrizeCreate) -> ClientResult<Prize> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let created = Prize {
            id: Some(self.assign_id()),
            name: prize.name.clone(),
            kind: prize.kind.clone().unwrap_or_default(),
            description: prize.description.clone().unwrap_or_default(),
            image: prize.image.clone().unwrap_or_default(),
            count: prize.count,
            remaining: prize.count,
            value: prize.value.unwrap_or_default(),
            order: prize.order.unwrap_or_default(),
            created_at: None,
            updated_at: None,
        };
        self.prizes.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_prize(&self, id: &str, prize: &PrizeUpdate) -> ClientResult<Prize> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let mut prizes = self.prizes.lock().unwrap();
        let existing = prizes
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| ClientError::NotFound(format!("prize {id}")))?;
        if let Some(name) = &prize.name {
            existing.name = name.clone();
        }
        if let Some(count) = prize.count {
            existing.count = count;
        }
        if let Some(remaining) = prize.remaining {
            existing.remaining = remaining;
        }
        Ok(existing.clone())
    }

    async fn delete_prize(&self, id: &str) -> ClientResult<()> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        self.prizes
            .lock()
            .unwrap()
            .retain(|p| p.id.as_deref() != Some(id));
        Ok(())
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, user: &UserCreate) -> ClientResult<User> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let created = User {
            id: Some(self.assign_id()),
            number: user.number.clone(),
            name: user.name.clone(),
            department: user.department.clone(),
            position: user.position.clone(),
            avatar: user.avatar.clone(),
            participate_lottery: user.participate_lottery.unwrap_or(true),
            created_at: None,
            updated_at: None,
        };
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: &str, user: &UserUpdate) -> ClientResult<User> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let mut users = self.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.id.as_deref() == Some(id))
            .ok_or_else(|| ClientError::NotFound(format!("user {id}")))?;
        if let Some(name) = &user.name {
            existing.name = name.clone();
        }
        if let Some(participate) = user.participate_lottery {
            existing.participate_lottery = participate;
        }
        Ok(existing.clone())
    }

    async fn delete_user(&self, id: &str) -> ClientResult<()> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        self.users
            .lock()
            .unwrap()
            .retain(|u| u.id.as_deref() != Some(id));
        Ok(())
    }

    async fn set_participation(&self, id: &str, participate: bool) -> ClientResult<User> {
        self.update_user(
            id,
            &UserUpdate {
                participate_lottery: Some(participate),
                ..UserUpdate::default()
            },
        )
        .await
    }

    async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.departments.lock().unwrap().clone())
    }

    async fn create_department(&self, dept: &DepartmentCreate) -> ClientResult<Department> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let created = Department {
            id: Some(self.assign_id()),
            name: dept.name.clone(),
            code: dept.code.clone(),
            parent: dept.parent.clone(),
            order: dept.order.unwrap_or_default(),
            created_at: None,
            updated_at: None,
        };
        self.departments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_department(
        &self,
        id: &str,
        dept: &DepartmentUpdate,
    ) -> ClientResult<Department> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let mut departments = self.departments.lock().unwrap();
        let existing = departments
            .iter_mut()
            .find(|d| d.id.as_deref() == Some(id))
            .ok_or_else(|| ClientError::NotFound(format!("department {id}")))?;
        if let Some(name) = &dept.name {
            existing.name = name.clone();
        }
        if let Some(parent) = &dept.parent {
            existing.parent = Some(parent.clone());
        }
        Ok(existing.clone())
    }

    async fn delete_department(&self, id: &str) -> ClientResult<()> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        self.departments
            .lock()
            .unwrap()
            .retain(|d| d.id.as_deref() != Some(id));
        Ok(())
    }

    async fn get_settings(&self) -> ClientResult<Settings> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, settings: &Settings) -> ClientResult<Settings> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        *self.settings.lock().unwrap() = settings.clone();
        Ok(settings.clone())
    }

    async fn list_records(&self) -> ClientResult<Vec<LotteryRecord>> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create_record(&self, record: &LotteryRecordCreate) -> ClientResult<LotteryRecord> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let created = LotteryRecord {
            id: Some(self.assign_id()),
            prize_id: record.prize_id.clone(),
            user_id: record.user_id.clone(),
            prize_name: record.prize_name.clone(),
            user_name: record.user_name.clone(),
            user_department: record.user_department.clone().unwrap_or_default(),
            timestamp: record.timestamp.unwrap_or_else(chrono::Utc::now),
        };
        self.records.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn export_records(&self, _format: &str) -> ClientResult<String> {
        Ok(String::new())
    }

    async fn fetch_fragment(&self, name: &str) -> ClientResult<String> {
        if let Some(e) = self.take_failure() {
            return Err(e);
        }
        let delay = self.fragment_delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(format!("<div id=\"{name}-panel\"></div>"))
    }
}

// ========== Recording UI sink ==========

#[derive(Debug, Clone, PartialEq)]
enum UiEvent {
    Content(String),
    Section(String, String),
    Message(MessageLevel, String),
    Toolbar(ToolbarVisibility),
    Redirect,
    Preview,
}

#[derive(Default)]
struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    fn redirects(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == UiEvent::Redirect)
            .count()
    }

    fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Message(level, text) => Some((level, text)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl AdminUi for RecordingUi {
    fn set_content(&self, html: &str) {
        self.push(UiEvent::Content(html.to_string()));
    }
    fn update_section(&self, section_id: &str, html: &str) {
        self.push(UiEvent::Section(section_id.to_string(), html.to_string()));
    }
    fn show_message(&self, level: MessageLevel, text: &str) {
        self.push(UiEvent::Message(level, text.to_string()));
    }
    fn set_toolbar(&self, toolbar: ToolbarVisibility) {
        self.push(UiEvent::Toolbar(toolbar));
    }
    fn redirect_to_login(&self) {
        self.push(UiEvent::Redirect);
    }
    fn open_preview(&self) {
        self.push(UiEvent::Preview);
    }
}

// ========== Fixtures ==========

fn prize(id: &str, name: &str, count: u32) -> Prize {
    Prize {
        id: Some(id.to_string()),
        name: name.to_string(),
        kind: String::new(),
        description: String::new(),
        image: String::new(),
        count,
        remaining: count,
        value: 0,
        order: 0,
        created_at: None,
        updated_at: None,
    }
}

fn user(id: &str, number: &str, name: &str, department: &str) -> User {
    User {
        id: Some(id.to_string()),
        number: number.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        position: None,
        avatar: None,
        participate_lottery: true,
        created_at: None,
        updated_at: None,
    }
}

fn department(id: &str, code: &str, parent: Option<&str>) -> Department {
    Department {
        id: Some(id.to_string()),
        name: code.to_uppercase(),
        code: code.to_string(),
        parent: parent.map(str::to_string),
        order: 0,
        created_at: None,
        updated_at: None,
    }
}

struct Harness {
    api: Arc<MockApi>,
    store: Arc<Store>,
    ui: Arc<RecordingUi>,
}

impl Harness {
    fn new(api: MockApi) -> Self {
        let api = Arc::new(api);
        Self {
            store: Arc::new(Store::new(api.clone())),
            ui: Arc::new(RecordingUi::default()),
            api,
        }
    }

    fn manager(&self, registry: PanelRegistry) -> LifecycleManager {
        LifecycleManager::new(
            PanelContext {
                api: self.api.clone(),
                store: self.store.clone(),
                ui: self.ui.clone(),
            },
            registry,
        )
    }

    fn default_registry() -> PanelRegistry {
        let mut registry = PanelRegistry::new();
        registry.register(PanelKind::PrizeManage, init_prize_manage);
        registry.register(PanelKind::UserManage, init_user_manage);
        registry.register(PanelKind::Settings, init_settings);
        registry
    }
}

// ========== Store ==========

#[tokio::test]
async fn test_init_populates_snapshot() {
    let h = Harness::new(MockApi::seeded(
        vec![prize("p1", "TV", 3)],
        vec![user("u1", "1001", "Ada", "eng")],
        vec![department("d1", "eng", None)],
    ));

    h.store.init().await.unwrap();

    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.prizes.len(), 1);
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.departments.len(), 1);
    assert!(snapshot.settings.is_some());
    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_init_failure_lands_in_snapshot() {
    let h = Harness::new(MockApi::default());
    h.api.fail_next(err_from_status(500));

    let result = h.store.init().await;

    assert!(result.is_err());
    let snapshot = h.store.snapshot();
    assert!(!snapshot.loading);
    let failure = snapshot.error.as_ref().expect("failure recorded");
    assert_eq!(failure.class, ErrorClass::Server);
}

#[tokio::test]
async fn test_patch_merge_is_idempotent() {
    let h = Harness::new(MockApi::default());
    let patch = StatePatch {
        prizes: Some(vec![prize("p1", "TV", 3)]),
        loading: Some(true),
        ..StatePatch::default()
    };

    h.store.set_state(patch.clone());
    let first = h.store.snapshot();
    h.store.set_state(patch);
    let second = h.store.snapshot();

    assert_eq!(*first, *second);
}

#[tokio::test]
async fn test_patch_none_fields_keep_prior_values() {
    let h = Harness::new(MockApi::default());
    h.store.set_state(StatePatch {
        prizes: Some(vec![prize("p1", "TV", 3)]),
        ..StatePatch::default()
    });
    h.store.set_state(StatePatch {
        users: Some(vec![user("u1", "1001", "Ada", "eng")]),
        ..StatePatch::default()
    });

    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.prizes.len(), 1);
    assert_eq!(snapshot.users.len(), 1);
}

#[tokio::test]
async fn test_listeners_run_in_registration_order() {
    let h = Harness::new(MockApi::default());
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = order.clone();
    let first = h.store.subscribe(move |_| o.lock().unwrap().push(1));
    let o = order.clone();
    h.store.subscribe(move |_| o.lock().unwrap().push(2));

    h.store.set_state(StatePatch::loading(true));
    assert_eq!(*order.lock().unwrap(), vec![1, 2]);

    assert!(h.store.unsubscribe(first));
    assert!(!h.store.unsubscribe(first));

    h.store.set_state(StatePatch::loading(false));
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 2]);
}

#[tokio::test]
async fn test_reentrant_set_state_is_dropped() {
    let h = Harness::new(MockApi::default());
    let store = h.store.clone();
    h.store.subscribe(move |_| {
        // Must neither deadlock nor apply
        store.set_state(StatePatch {
            prizes: Some(vec![prize("p9", "Sneaky", 1)]),
            ..StatePatch::default()
        });
    });

    h.store.set_state(StatePatch::loading(true));

    let snapshot = h.store.snapshot();
    assert!(snapshot.loading);
    assert!(snapshot.prizes.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_set_state_during_notify_applies() {
    use std::sync::atomic::{AtomicBool, Ordering};

    let h = Harness::new(MockApi::default());
    // First notify stalls in its listener while the second update lands
    let first_call = Arc::new(AtomicBool::new(true));
    let gate = first_call.clone();
    h.store.subscribe(move |_| {
        if gate.swap(false, Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(200));
        }
    });

    let store = h.store.clone();
    let first = tokio::task::spawn_blocking(move || {
        store.set_state(StatePatch {
            prizes: Some(vec![prize("p1", "TV", 3)]),
            ..StatePatch::default()
        });
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let store = h.store.clone();
    let second = tokio::task::spawn_blocking(move || {
        store.set_state(StatePatch {
            users: Some(vec![user("u1", "1001", "Ada", "eng")]),
            ..StatePatch::default()
        });
    });

    first.await.unwrap();
    second.await.unwrap();

    // Both updates must survive; neither is mistaken for reentrancy
    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.prizes.len(), 1);
    assert_eq!(snapshot.users.len(), 1);
}

#[tokio::test]
async fn test_add_prize_defaults_remaining_to_count() {
    let h = Harness::new(MockApi::default());

    let created = h
        .store
        .add_prize(&PrizeCreate::new("Grand Prize", 5))
        .await
        .unwrap();

    assert_eq!(created.remaining, 5);
    assert_eq!(created.count, 5);
    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.prizes.len(), 1);
    assert_eq!(snapshot.prizes[0].remaining, 5);
}

#[tokio::test]
async fn test_mutation_failure_recorded_and_reraised() {
    let h = Harness::new(MockApi::default());
    h.api.fail_next(err_from_status(400));

    let result = h.store.add_prize(&PrizeCreate::new("TV", 0)).await;

    let err = result.expect_err("validation failure");
    assert_eq!(err.class(), ErrorClass::Validation);
    let snapshot = h.store.snapshot();
    let failure = snapshot.error.as_ref().expect("failure recorded");
    assert_eq!(failure.class, ErrorClass::Validation);
    assert!(snapshot.prizes.is_empty());
}

#[tokio::test]
async fn test_set_participation_replaces_in_place() {
    let h = Harness::new(MockApi::seeded(
        Vec::new(),
        vec![
            user("u1", "1001", "Ada", "eng"),
            user("u2", "1002", "Grace", "hr"),
        ],
        Vec::new(),
    ));
    h.store.init().await.unwrap();

    let updated = h.store.set_participation("u1", false).await.unwrap();

    assert!(!updated.participate_lottery);
    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.users.len(), 2);
    assert!(!snapshot.users[0].participate_lottery);
    assert!(snapshot.users[1].participate_lottery);
}

#[tokio::test]
async fn test_department_self_parent_rejected() {
    let h = Harness::new(MockApi::default());

    let result = h
        .store
        .add_department(&DepartmentCreate {
            name: "Engineering".into(),
            code: "eng".into(),
            parent: Some("eng".into()),
            order: None,
        })
        .await;

    let err = result.expect_err("cycle must be rejected");
    assert!(matches!(err, AdminError::DepartmentCycle(_)));
    assert!(h.api.departments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_department_update_closing_cycle_rejected() {
    let h = Harness::new(MockApi::seeded(
        Vec::new(),
        Vec::new(),
        vec![
            department("d1", "eng", None),
            department("d2", "hr", Some("eng")),
        ],
    ));
    h.store.init().await.unwrap();

    // Re-parenting eng under hr would close eng -> hr -> eng
    let result = h
        .store
        .update_department(
            "d1",
            &DepartmentUpdate {
                parent: Some("hr".into()),
                ..DepartmentUpdate::default()
            },
        )
        .await;

    let err = result.expect_err("cycle must be rejected");
    assert_eq!(err.class(), ErrorClass::Validation);
    // Remote state untouched
    assert!(h.api.departments.lock().unwrap()[0].parent.is_none());
}

#[tokio::test]
async fn test_add_record_prepends() {
    let h = Harness::new(MockApi::default());
    let entry = |prize_name: &str| LotteryRecordCreate {
        prize_id: "p1".into(),
        user_id: "u1".into(),
        prize_name: prize_name.into(),
        user_name: "Ada".into(),
        user_department: None,
        timestamp: None,
    };

    h.store.add_record(&entry("first")).await.unwrap();
    h.store.add_record(&entry("second")).await.unwrap();

    let snapshot = h.store.snapshot();
    assert_eq!(snapshot.records[0].prize_name, "second");
    assert_eq!(snapshot.records[1].prize_name, "first");
}

// ========== Reporter ==========

#[tokio::test]
async fn test_reporter_side_effect_per_class() {
    let ui = Arc::new(RecordingUi::default());
    let reporter = ErrorReporter::new(ui.clone());

    for status in [400u16, 404, 500, 503] {
        reporter.handle(&AdminError::Api(err_from_status(status)));
    }
    reporter.handle(&AdminError::Api(network_error().await));

    let messages = ui.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0].1, "count must be positive");
    assert_eq!(messages[1].1, "The requested resource does not exist");
    assert_eq!(messages[2].1, "Server error, try again later");
    assert_eq!(messages[3].1, "Server error, try again later");
    assert_eq!(
        messages[4].1,
        "Network connection failed, check your connection"
    );
    assert_eq!(ui.redirects(), 0);
}

#[tokio::test]
async fn test_auth_failure_redirects_exactly_once() {
    let ui = Arc::new(RecordingUi::default());
    let reporter = ErrorReporter::new(ui.clone());

    let class = reporter.handle(&AdminError::Api(err_from_status(401)));

    assert_eq!(class, ErrorClass::Auth);
    assert_eq!(ui.redirects(), 1);
    assert!(ui.messages().is_empty());
}

// ========== Lifecycle ==========

#[tokio::test]
async fn test_navigation_installs_panel_and_toolbar() {
    let h = Harness::new(MockApi::seeded(
        vec![prize("p1", "TV", 3)],
        Vec::new(),
        Vec::new(),
    ));
    let manager = h.manager(Harness::default_registry());

    manager.load_component("prize-manage").await;

    assert_eq!(manager.active_kind().await, Some(PanelKind::PrizeManage));
    let events = h.ui.events();
    let last_toolbar = events
        .iter()
        .rev()
        .find_map(|e| match e {
            UiEvent::Toolbar(t) => Some(*t),
            _ => None,
        })
        .expect("toolbar set");
    assert_eq!(
        last_toolbar,
        ToolbarVisibility {
            save: true,
            preview: true
        }
    );
    // Fragment injected before sections render
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Content(html) if html.contains("prize-manage-panel")
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Section(id, html) if id == "prizeTableBody" && html.contains("TV")
    )));
}

#[tokio::test]
async fn test_unknown_component_leaves_no_active_panel() {
    let h = Harness::new(MockApi::default());
    let manager = h.manager(Harness::default_registry());
    manager.load_component("settings").await;
    assert_eq!(manager.active_kind().await, Some(PanelKind::Settings));

    manager.load_component("does-not-exist").await;

    assert_eq!(manager.active_kind().await, None);
    let events = h.ui.events();
    assert!(events.iter().any(|e| matches!(
        e,
        UiEvent::Content(html) if html.contains("Load failed")
    )));
    assert_eq!(
        h.ui.messages().last().map(|(_, text)| text.clone()),
        Some("Operation failed, please retry".to_string())
    );
}

#[tokio::test]
async fn test_failed_load_leaves_no_active_panel() {
    let h = Harness::new(MockApi::default());
    let manager = h.manager(Harness::default_registry());
    h.api.fail_next(err_from_status(500));

    manager.load_component("prize-manage").await;

    assert_eq!(manager.active_kind().await, None);
    let events = h.ui.events();
    let last_toolbar = events.iter().rev().find_map(|e| match e {
        UiEvent::Toolbar(t) => Some(*t),
        _ => None,
    });
    assert_eq!(last_toolbar, Some(ToolbarVisibility::hidden()));
}

#[tokio::test]
async fn test_preview_noop_without_capability() {
    let h = Harness::new(MockApi::default());
    let manager = h.manager(Harness::default_registry());

    // No active panel at all
    manager.preview().await;
    manager.save().await;
    manager.refresh().await;
    assert_eq!(h.ui.events().iter().filter(|e| **e == UiEvent::Preview).count(), 0);

    // user-manage declares no preview capability
    manager.load_component("user-manage").await;
    manager.preview().await;
    assert_eq!(h.ui.events().iter().filter(|e| **e == UiEvent::Preview).count(), 0);

    manager.load_component("prize-manage").await;
    manager.preview().await;
    assert_eq!(h.ui.events().iter().filter(|e| **e == UiEvent::Preview).count(), 1);
}

#[tokio::test]
async fn test_prize_save_snapshots_list_into_settings() {
    let h = Harness::new(MockApi::seeded(
        vec![
            prize("p1", "TV", 3),
            prize("p2", "Phone", 5),
            prize("p3", "Voucher", 10),
        ],
        Vec::new(),
        Vec::new(),
    ));
    h.store.init().await.unwrap();
    let manager = h.manager(Harness::default_registry());
    manager.load_component("prize-manage").await;

    manager.save().await;

    let snapshot = h.store.snapshot();
    let settings = snapshot.settings.as_ref().expect("settings present");
    let prizes = settings
        .get("prizes")
        .and_then(|v| v.as_array())
        .expect("prizes key written");
    assert_eq!(prizes.len(), 3);
    assert_eq!(prizes[0]["name"], "TV");
    // Remote document matches
    let remote = h.api.settings.lock().unwrap().clone();
    assert_eq!(
        remote.get("prizes").and_then(|v| v.as_array()).map(Vec::len),
        Some(3)
    );
    assert!(h
        .ui
        .messages()
        .iter()
        .any(|(level, text)| *level == MessageLevel::Success && text == "Saved"));
}

// Logs construction and teardown order through the registry
struct TracingPanel {
    kind: PanelKind,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Panel for TracingPanel {
    fn kind(&self) -> PanelKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            destroy: true,
            ..Capabilities::default()
        }
    }

    async fn refresh(&mut self) -> AdminResult<()> {
        Ok(())
    }

    fn destroy(&mut self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("destroy:{}", self.kind.name()));
    }
}

fn tracing_registry(log: Arc<Mutex<Vec<String>>>) -> PanelRegistry {
    let mut registry = PanelRegistry::new();
    for kind in [PanelKind::PrizeManage, PanelKind::UserManage, PanelKind::Settings] {
        let log = log.clone();
        registry.register(kind, move |_ctx| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("create:{}", kind.name()));
                Ok(Box::new(TracingPanel {
                    kind,
                    log: log.clone(),
                }) as Box<dyn Panel>)
            }
        });
    }
    registry
}

#[tokio::test]
async fn test_outgoing_panel_destroyed_before_next_initializes() {
    let h = Harness::new(MockApi::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let manager = h.manager(tracing_registry(log.clone()));

    manager.load_component("prize-manage").await;
    manager.load_component("settings").await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "create:prize-manage".to_string(),
            "destroy:prize-manage".to_string(),
            "create:settings".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_fetch_skipped_after_race() {
    let h = Harness::new(MockApi::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    h.api
        .delay_fragment("prize-manage", Duration::from_millis(100));
    h.api.delay_fragment("settings", Duration::from_millis(10));
    let manager = Arc::new(h.manager(tracing_registry(log.clone())));

    let m = manager.clone();
    let slow = tokio::spawn(async move { m.load_component("prize-manage").await });
    // Let the first navigation claim its generation and start fetching
    tokio::task::yield_now().await;
    let m = manager.clone();
    let fast = tokio::spawn(async move { m.load_component("settings").await });

    slow.await.unwrap();
    fast.await.unwrap();

    // The newer navigation wins; the stale fetch never mounts or builds
    assert_eq!(manager.active_kind().await, Some(PanelKind::Settings));
    assert_eq!(*log.lock().unwrap(), vec!["create:settings".to_string()]);
    // The content region shows the winner's markup, not the loser's
    let last_content = h.ui.events().iter().rev().find_map(|e| match e {
        UiEvent::Content(html) => Some(html.clone()),
        _ => None,
    });
    assert_eq!(
        last_content.as_deref(),
        Some("<div id=\"settings-panel\"></div>")
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_factory_result_destroyed_not_installed() {
    let h = Harness::new(MockApi::default());
    let log = Arc::new(Mutex::new(Vec::new()));

    // Prize's factory is slow, so the newer navigation overtakes it after
    // its fragment already mounted
    let mut registry = PanelRegistry::new();
    let l = log.clone();
    registry.register(PanelKind::PrizeManage, move |_ctx| {
        let log = l.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            log.lock().unwrap().push("create:prize-manage".to_string());
            Ok(Box::new(TracingPanel {
                kind: PanelKind::PrizeManage,
                log: log.clone(),
            }) as Box<dyn Panel>)
        }
    });
    let l = log.clone();
    registry.register(PanelKind::Settings, move |_ctx| {
        let log = l.clone();
        async move {
            log.lock().unwrap().push("create:settings".to_string());
            Ok(Box::new(TracingPanel {
                kind: PanelKind::Settings,
                log: log.clone(),
            }) as Box<dyn Panel>)
        }
    });
    let manager = Arc::new(h.manager(registry));

    let m = manager.clone();
    let slow = tokio::spawn(async move { m.load_component("prize-manage").await });
    tokio::task::yield_now().await;
    let m = manager.clone();
    let fast = tokio::spawn(async move { m.load_component("settings").await });

    slow.await.unwrap();
    fast.await.unwrap();

    // The stale factory result is destroyed instead of installed
    assert_eq!(manager.active_kind().await, Some(PanelKind::Settings));
    let log = log.lock().unwrap();
    assert!(log.contains(&"destroy:prize-manage".to_string()));
    assert!(!log.contains(&"destroy:settings".to_string()));
}

#[tokio::test]
async fn test_refresh_rerenders_active_panel() {
    let h = Harness::new(MockApi::seeded(
        vec![prize("p1", "TV", 3)],
        Vec::new(),
        Vec::new(),
    ));
    let manager = h.manager(Harness::default_registry());
    manager.load_component("prize-manage").await;

    h.api.prizes.lock().unwrap().push(prize("p2", "Phone", 5));
    manager.refresh().await;

    let events = h.ui.events();
    let last_table = events
        .iter()
        .rev()
        .find_map(|e| match e {
            UiEvent::Section(id, html) if id == "prizeTableBody" => Some(html.clone()),
            _ => None,
        })
        .expect("table rendered");
    assert!(last_table.contains("Phone"));
}

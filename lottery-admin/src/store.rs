//! State container
//!
//! One process-wide snapshot of domain state with subscribe/notify
//! semantics. The snapshot is an `Arc` swapped atomically per update;
//! listeners run synchronously in registration order with the post-merge
//! value. Mutating operations round-trip through the remote layer and then
//! apply a minimal targeted merge (append, replace-by-id, filter-by-id)
//! rather than a full reload.

use crate::error::{AdminError, AdminResult};
use lottery_client::LotteryApi;
use shared::ErrorClass;
use shared::client::CurrentUser;
use shared::models::{
    Department, DepartmentCreate, DepartmentUpdate, LotteryRecord, LotteryRecordCreate, Prize,
    PrizeCreate, PrizeUpdate, Settings, User, UserCreate, UserUpdate,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Parent chains longer than this are treated as cyclic
const MAX_PARENT_DEPTH: usize = 64;

thread_local! {
    /// Stores whose listeners are running on this thread's call stack.
    /// Reentrancy is a same-call-stack property; updates arriving from
    /// other tasks while listeners run must still apply.
    static NOTIFYING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Failure recorded into the snapshot for subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub class: ErrorClass,
    pub message: String,
}

impl From<&AdminError> for StoreFailure {
    fn from(error: &AdminError) -> Self {
        Self {
            class: error.class(),
            message: error.to_string(),
        }
    }
}

/// The store's single current state value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pub prizes: Vec<Prize>,
    pub users: Vec<User>,
    pub departments: Vec<Department>,
    pub records: Vec<LotteryRecord>,
    pub settings: Option<Settings>,
    pub current_user: Option<CurrentUser>,
    pub loading: bool,
    pub error: Option<StoreFailure>,
}

/// Shallow partial update: `Some` fields overwrite, `None` fields keep the
/// prior value. Nested documents (settings) are replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub prizes: Option<Vec<Prize>>,
    pub users: Option<Vec<User>>,
    pub departments: Option<Vec<Department>>,
    pub records: Option<Vec<LotteryRecord>>,
    pub settings: Option<Option<Settings>>,
    pub current_user: Option<Option<CurrentUser>>,
    pub loading: Option<bool>,
    pub error: Option<Option<StoreFailure>>,
}

impl StatePatch {
    pub fn loading(loading: bool) -> Self {
        Self {
            loading: Some(loading),
            ..Self::default()
        }
    }

    pub fn failure(failure: StoreFailure) -> Self {
        Self {
            error: Some(Some(failure)),
            ..Self::default()
        }
    }

    fn apply(self, prior: &StateSnapshot) -> StateSnapshot {
        StateSnapshot {
            prizes: self.prizes.unwrap_or_else(|| prior.prizes.clone()),
            users: self.users.unwrap_or_else(|| prior.users.clone()),
            departments: self
                .departments
                .unwrap_or_else(|| prior.departments.clone()),
            records: self.records.unwrap_or_else(|| prior.records.clone()),
            settings: self.settings.unwrap_or_else(|| prior.settings.clone()),
            current_user: self
                .current_user
                .unwrap_or_else(|| prior.current_user.clone()),
            loading: self.loading.unwrap_or(prior.loading),
            error: self.error.unwrap_or_else(|| prior.error.clone()),
        }
    }
}

/// Handle returned by [`Store::subscribe`]; pass to [`Store::unsubscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StateSnapshot) + Send + Sync>;

/// Publish-subscribe state container
pub struct Store {
    api: Arc<dyn LotteryApi>,
    state: RwLock<Arc<StateSnapshot>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

impl Store {
    /// Construct an empty store over the given remote layer
    pub fn new(api: Arc<dyn LotteryApi>) -> Self {
        Self {
            api,
            state: RwLock::new(Arc::new(StateSnapshot::default())),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Register a listener invoked with the full snapshot on every update.
    /// No deduplication: registering the same closure twice notifies twice.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners_lock().push((id, Arc::new(listener)));
        SubscriptionId(id)
    }

    /// Remove a listener; returns whether it was still registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners_lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id.0);
        listeners.len() != before
    }

    /// Shallow-merge `patch` over the snapshot and notify listeners.
    ///
    /// Rejected (logged, not applied) when called from inside one of this
    /// store's own listeners: reentrant mutation during notify is not
    /// allowed. Updates from other tasks running concurrently with a
    /// notify apply normally.
    pub fn set_state(&self, patch: StatePatch) {
        if self.is_notifying() {
            tracing::error!("set_state called from within a listener; update dropped");
            return;
        }

        let next = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            let next = Arc::new(patch.apply(&state));
            *state = next.clone();
            next
        };
        self.notify(&next);
    }

    /// Run listeners synchronously, in registration order. The listener
    /// list is cloned out of the lock first, so listeners may subscribe or
    /// unsubscribe freely; such changes take effect from the next notify.
    fn notify(&self, snapshot: &StateSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners_lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();

        // Pop this store off the stack even if a listener panics
        struct NotifyGuard(usize);
        impl Drop for NotifyGuard {
            fn drop(&mut self) {
                NOTIFYING.with(|stack| stack.borrow_mut().retain(|addr| *addr != self.0));
            }
        }

        let addr = self as *const Self as usize;
        NOTIFYING.with(|stack| stack.borrow_mut().push(addr));
        let _guard = NotifyGuard(addr);
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn is_notifying(&self) -> bool {
        let addr = self as *const Self as usize;
        NOTIFYING.with(|stack| stack.borrow().contains(&addr))
    }

    fn listeners_lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a failure into the snapshot, then re-raise it
    fn record_failure(&self, error: AdminError) -> AdminError {
        self.set_state(StatePatch::failure(StoreFailure::from(&error)));
        error
    }

    // ========== Initialization ==========

    /// Populate the snapshot: fetches prizes, participants, departments and
    /// settings concurrently. `loading` is true for the duration and false
    /// on completion regardless of outcome; a failure lands in the
    /// snapshot's `error` for subscribers and is also returned to the
    /// direct awaiter.
    pub async fn init(&self) -> AdminResult<()> {
        self.set_state(StatePatch::loading(true));

        let result = tokio::try_join!(
            self.api.list_prizes(),
            self.api.list_users(),
            self.api.list_departments(),
            self.api.get_settings(),
        );

        let outcome = match result {
            Ok((prizes, users, departments, settings)) => {
                tracing::info!(
                    prizes = prizes.len(),
                    users = users.len(),
                    departments = departments.len(),
                    "store initialized"
                );
                self.set_state(StatePatch {
                    prizes: Some(prizes),
                    users: Some(users),
                    departments: Some(departments),
                    settings: Some(Some(settings)),
                    error: Some(None),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(e) => Err(self.record_failure(e.into())),
        };

        self.set_state(StatePatch::loading(false));
        outcome
    }

    // ========== Prizes ==========

    pub async fn add_prize(&self, prize: &PrizeCreate) -> AdminResult<Prize> {
        match self.api.create_prize(prize).await {
            Ok(created) => {
                let mut prizes = self.snapshot().prizes.clone();
                prizes.push(created.clone());
                self.set_state(StatePatch {
                    prizes: Some(prizes),
                    ..StatePatch::default()
                });
                Ok(created)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn update_prize(&self, id: &str, prize: &PrizeUpdate) -> AdminResult<Prize> {
        match self.api.update_prize(id, prize).await {
            Ok(updated) => {
                let prizes = self
                    .snapshot()
                    .prizes
                    .iter()
                    .map(|p| {
                        if p.id.as_deref() == Some(id) {
                            updated.clone()
                        } else {
                            p.clone()
                        }
                    })
                    .collect();
                self.set_state(StatePatch {
                    prizes: Some(prizes),
                    ..StatePatch::default()
                });
                Ok(updated)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn delete_prize(&self, id: &str) -> AdminResult<()> {
        match self.api.delete_prize(id).await {
            Ok(()) => {
                let mut prizes = self.snapshot().prizes.clone();
                prizes.retain(|p| p.id.as_deref() != Some(id));
                self.set_state(StatePatch {
                    prizes: Some(prizes),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    // ========== Participants ==========

    pub async fn add_user(&self, user: &UserCreate) -> AdminResult<User> {
        match self.api.create_user(user).await {
            Ok(created) => {
                let mut users = self.snapshot().users.clone();
                users.push(created.clone());
                self.set_state(StatePatch {
                    users: Some(users),
                    ..StatePatch::default()
                });
                Ok(created)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn update_user(&self, id: &str, user: &UserUpdate) -> AdminResult<User> {
        match self.api.update_user(id, user).await {
            Ok(updated) => {
                self.replace_user(&updated, id);
                Ok(updated)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn delete_user(&self, id: &str) -> AdminResult<()> {
        match self.api.delete_user(id).await {
            Ok(()) => {
                let mut users = self.snapshot().users.clone();
                users.retain(|u| u.id.as_deref() != Some(id));
                self.set_state(StatePatch {
                    users: Some(users),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn set_participation(&self, id: &str, participate: bool) -> AdminResult<User> {
        match self.api.set_participation(id, participate).await {
            Ok(updated) => {
                self.replace_user(&updated, id);
                Ok(updated)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    fn replace_user(&self, updated: &User, id: &str) {
        let users = self
            .snapshot()
            .users
            .iter()
            .map(|u| {
                if u.id.as_deref() == Some(id) {
                    updated.clone()
                } else {
                    u.clone()
                }
            })
            .collect();
        self.set_state(StatePatch {
            users: Some(users),
            ..StatePatch::default()
        });
    }

    // ========== Departments ==========

    pub async fn add_department(&self, dept: &DepartmentCreate) -> AdminResult<Department> {
        if let Err(e) = self.check_parent_chain(&dept.code, dept.parent.as_deref()) {
            return Err(self.record_failure(e));
        }
        match self.api.create_department(dept).await {
            Ok(created) => {
                let mut departments = self.snapshot().departments.clone();
                departments.push(created.clone());
                self.set_state(StatePatch {
                    departments: Some(departments),
                    ..StatePatch::default()
                });
                Ok(created)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn update_department(
        &self,
        id: &str,
        dept: &DepartmentUpdate,
    ) -> AdminResult<Department> {
        // Validate against the effective post-update code/parent pair
        {
            let snapshot = self.snapshot();
            let existing = snapshot.departments.iter().find(|d| d.id.as_deref() == Some(id));
            let code = dept
                .code
                .as_deref()
                .or(existing.map(|d| d.code.as_str()));
            let parent = dept
                .parent
                .as_deref()
                .or(existing.and_then(|d| d.parent.as_deref()));
            if let Some(code) = code {
                if let Err(e) = self.check_parent_chain(code, parent) {
                    return Err(self.record_failure(e));
                }
            }
        }

        match self.api.update_department(id, dept).await {
            Ok(updated) => {
                let departments = self
                    .snapshot()
                    .departments
                    .iter()
                    .map(|d| {
                        if d.id.as_deref() == Some(id) {
                            updated.clone()
                        } else {
                            d.clone()
                        }
                    })
                    .collect();
                self.set_state(StatePatch {
                    departments: Some(departments),
                    ..StatePatch::default()
                });
                Ok(updated)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    pub async fn delete_department(&self, id: &str) -> AdminResult<()> {
        match self.api.delete_department(id).await {
            Ok(()) => {
                let mut departments = self.snapshot().departments.clone();
                departments.retain(|d| d.id.as_deref() != Some(id));
                self.set_state(StatePatch {
                    departments: Some(departments),
                    ..StatePatch::default()
                });
                Ok(())
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    /// Walk the parent chain from `parent`; reaching `code` again (or an
    /// over-deep chain) rejects the write before it hits the server.
    fn check_parent_chain(&self, code: &str, parent: Option<&str>) -> AdminResult<()> {
        let snapshot = self.snapshot();
        let by_code: HashMap<&str, Option<&str>> = snapshot
            .departments
            .iter()
            .map(|d| (d.code.as_str(), d.parent.as_deref()))
            .collect();

        let mut current = parent;
        let mut depth = 0;
        while let Some(p) = current {
            if p == code {
                return Err(AdminError::DepartmentCycle(format!(
                    "department {code} reaches itself through its parent chain"
                )));
            }
            depth += 1;
            if depth > MAX_PARENT_DEPTH {
                return Err(AdminError::DepartmentCycle(format!(
                    "parent chain above {code} exceeds {MAX_PARENT_DEPTH} levels"
                )));
            }
            current = by_code.get(p).copied().flatten();
        }
        Ok(())
    }

    // ========== Settings ==========

    /// Full-document replace; callers submit the entire desired document
    pub async fn update_settings(&self, settings: &Settings) -> AdminResult<Settings> {
        match self.api.update_settings(settings).await {
            Ok(updated) => {
                self.set_state(StatePatch {
                    settings: Some(Some(updated.clone())),
                    ..StatePatch::default()
                });
                Ok(updated)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    // ========== Records ==========

    /// Append-only audit entry; newest first, matching the server ordering
    pub async fn add_record(&self, record: &LotteryRecordCreate) -> AdminResult<LotteryRecord> {
        match self.api.create_record(record).await {
            Ok(created) => {
                let mut records = self.snapshot().records.clone();
                records.insert(0, created.clone());
                self.set_state(StatePatch {
                    records: Some(records),
                    ..StatePatch::default()
                });
                Ok(created)
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }
}

//! Persistent session token storage
//!
//! The console keeps the session token (and its optional remember-me
//! expiry) in a small JSON file next to the app, read on every remote
//! call. Absence of a token is not validated locally; the first 401 from
//! the server is what invalidates the session.

use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Remember-me extends the local session by this many days
const REMEMBER_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session file contents: the well-known token / token_expire pair
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SessionData {
    token: Option<String>,
    token_expire: Option<DateTime<Utc>>,
}

impl SessionData {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.token_expire, Some(expire) if expire < now)
    }
}

/// File-backed session token store
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    data: Mutex<SessionData>,
}

impl SessionStore {
    /// Open the store, loading any existing session file. A missing or
    /// unreadable file starts an empty session rather than failing.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();

        Self {
            path,
            data: Mutex::new(data),
        }
    }

    /// In-memory store for tests and ephemeral sessions
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            data: Mutex::new(SessionData::default()),
        }
    }

    /// Store a fresh token. With `remember` the session survives for
    /// seven days; without it the token lives until the server rejects it.
    pub fn set_token(&self, token: impl Into<String>, remember: bool) -> Result<(), SessionError> {
        let data = {
            let mut guard = self.lock();
            guard.token = Some(token.into());
            guard.token_expire = remember.then(|| Utc::now() + Duration::days(REMEMBER_DAYS));
            guard.clone()
        };
        self.persist(&data)
    }

    /// Current token, dropping it first if the remember-me window lapsed
    pub fn token(&self) -> Option<String> {
        let mut guard = self.lock();
        if guard.is_expired(Utc::now()) {
            tracing::debug!("session token expired, clearing");
            *guard = SessionData::default();
            let snapshot = guard.clone();
            drop(guard);
            let _ = self.persist(&snapshot);
            return None;
        }
        guard.token.clone()
    }

    /// Expiry of the current session, when remember-me is active
    pub fn token_expire(&self) -> Option<DateTime<Utc>> {
        self.lock().token_expire
    }

    /// Invalidate the session (logout, or a 401 from the server)
    pub fn clear(&self) {
        let data = {
            let mut guard = self.lock();
            *guard = SessionData::default();
            guard.clone()
        };
        if let Err(e) = self.persist(&data) {
            tracing::warn!("failed to persist cleared session: {}", e);
        }
    }

    fn persist(&self, data: &SessionData) -> Result<(), SessionError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(data)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionData> {
        // Mutex poisoning only matters if a holder panicked; recover the data
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! Session lifecycle: persisted token + user, exposed as an explicit context
//! object with a typed state.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use shared::domain::{SessionUser, UserId};
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub token: String,
    pub user: SessionUser,
}

/// Durable storage for the session, the console's equivalent of browser
/// local storage.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, source: std::io::Error) -> ClientError {
        ClientError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.storage_error(err)),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let session: PersistedSession = serde_json::from_str(&raw)?;
        if session.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.storage_error(err))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw).map_err(|err| self.storage_error(err))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.storage_error(err)),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(SessionUser),
    Anonymous,
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}

pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    token: RwLock<Option<String>>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Arc::new(Self {
            store,
            token: RwLock::new(None),
            state,
        })
    }

    /// Reads the persisted token and user. Both must be present for the
    /// session to count as authenticated.
    pub async fn initialize(&self) -> SessionState {
        self.state.send_replace(SessionState::Loading);

        let next = match self.store.load() {
            Ok(Some(persisted)) => {
                *self.token.write().await = Some(persisted.token);
                info!(user_id = persisted.user.id.0, "restored persisted session");
                SessionState::Authenticated(persisted.user)
            }
            Ok(None) => {
                *self.token.write().await = None;
                SessionState::Anonymous
            }
            Err(err) => {
                warn!(%err, "discarding unreadable persisted session");
                *self.token.write().await = None;
                SessionState::Anonymous
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    pub fn require_user(&self) -> Result<SessionUser> {
        self.current_user().ok_or(ClientError::NotAuthenticated)
    }

    pub fn require_user_id(&self) -> Result<UserId> {
        self.require_user().map(|user| user.id)
    }

    pub async fn establish(&self, token: String, user: SessionUser) -> Result<()> {
        self.store.save(&PersistedSession {
            token: token.clone(),
            user: user.clone(),
        })?;
        *self.token.write().await = Some(token);
        info!(user_id = user.id.0, "session established");
        self.state.send_replace(SessionState::Authenticated(user));
        Ok(())
    }

    /// Replaces the stored user record, keeping the current token.
    pub async fn update_user(&self, user: SessionUser) -> Result<()> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotAuthenticated)?;
        self.store.save(&PersistedSession {
            token,
            user: user.clone(),
        })?;
        self.state.send_replace(SessionState::Authenticated(user));
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        self.state.send_replace(SessionState::Anonymous);
        self.store.clear()?;
        info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;

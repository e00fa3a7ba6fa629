//! Persisted auth session: the bearer token and the role that came with it.
//!
//! A `Session` is loaded once when `PortalClient` is built, replaced on
//! login and emptied on logout. Stores only move it in and out of storage;
//! there is no expiry or refresh on the client side.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token and role as last returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role.into()),
        }
    }

    /// An empty stored token counts as no token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.role.is_none()
    }
}

/// Durable home for a `Session`.
pub trait SessionStore {
    /// Returns an empty session when nothing has been saved.
    fn load(&self) -> Result<Session, ApiError>;
    fn save(&self, session: &Session) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Copy of what is currently stored.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        // A poisoned lock still holds a whole Session; writes are single assignments.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Session, ApiError> {
        Ok(self.lock().clone())
    }

    fn save(&self, session: &Session) -> Result<(), ApiError> {
        *self.lock() = session.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.lock() = Session::default();
        Ok(())
    }
}

/// JSON file holding the `token` and `role` keys.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Session, ApiError> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ApiError::Session(format!("failed to read {}: {e}", self.path.display())))?;
        serde_json::from_str(&contents)
            .map_err(|e| ApiError::Session(format!("failed to parse {}: {e}", self.path.display())))
    }

    fn save(&self, session: &Session) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApiError::Session(e.to_string()))?;
        }
        let contents =
            serde_json::to_string_pretty(session).map_err(|e| ApiError::Session(e.to_string()))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| ApiError::Session(format!("failed to write {}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<(), ApiError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                ApiError::Session(format!("failed to remove {}: {e}", self.path.display()))
            })?;
        }
        Ok(())
    }
}

//! Client-held session: credential, user id and role.
//!
//! The [`SessionStore`] is the only writer of session state. Readers take
//! lock-free snapshots, and every change is published on a watch channel so
//! dependents can react to login and logout.

mod storage;

pub use storage::{Entries, FileStorage, MemoryStorage, SessionStorage, StorageError};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::models::{Id, Role};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const ROLE_KEY: &str = "userRole";

/// An authenticated identity. All three parts exist together or not at all.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub credential: String,
    pub user_id: Id,
    pub role: Role,
}

impl Session {
    pub fn new(credential: impl Into<String>, user_id: impl Into<Id>, role: Role) -> Self {
        Self {
            credential: credential.into(),
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    fn from_entries(entries: &Entries) -> Option<Self> {
        let credential = entries.get(TOKEN_KEY)?;
        let user_id = entries.get(USER_ID_KEY)?;
        let role = entries.get(ROLE_KEY)?.parse().ok()?;

        if credential.is_empty() || user_id.is_empty() {
            return None;
        }

        Some(Self::new(credential.clone(), user_id.as_str(), role))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credential", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .finish()
    }
}

struct Inner {
    current: ArcSwapOption<Session>,
    storage: Box<dyn SessionStorage>,
    changes: watch::Sender<Option<Session>>,
    // Serializes writers so persisted and in-memory state change together
    write_lock: Mutex<()>,
}

/// Shared handle to the session. Cloning is cheap and every clone sees the
/// same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Open a store, restoring whatever session the storage holds.
    ///
    /// Incomplete or unreadable persisted entries restore as "no session".
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let restored = match storage.load() {
            Ok(entries) => {
                let session = Session::from_entries(&entries);
                if session.is_none() && !entries.is_empty() {
                    warn!("Ignoring incomplete persisted session");
                }
                session
            }
            Err(e) => {
                warn!(error = %e, "Could not read persisted session");
                None
            }
        };

        let (changes, _) = watch::channel(restored.clone());

        Self {
            inner: Arc::new(Inner {
                current: ArcSwapOption::new(restored.map(Arc::new)),
                storage: Box::new(storage),
                changes,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Store with no persisted state, for tests and one-off use
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::new())
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.inner.current.load_full().map(|s| (*s).clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.current.load().is_some()
    }

    /// Credential to attach to outbound requests
    pub fn credential(&self) -> Option<String> {
        self.inner
            .current
            .load_full()
            .map(|s| s.credential.clone())
    }

    /// Receive every subsequent session change
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.changes.subscribe()
    }

    /// Establish a session.
    ///
    /// Entries are persisted first; if that fails the previous session stays
    /// in place and nothing is published.
    pub fn login(&self, session: Session) -> Result<(), StorageError> {
        let _guard = self.inner.write_lock.lock();

        let mut entries = self.inner.storage.load().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), session.credential.clone());
        entries.insert(USER_ID_KEY.to_string(), session.user_id.to_string());
        entries.insert(ROLE_KEY.to_string(), session.role.as_str().to_string());
        self.inner.storage.save(&entries)?;

        info!(user_id = %session.user_id, role = %session.role, "Session established");
        self.publish(Some(session));
        Ok(())
    }

    /// Drop the session and its persisted entries.
    ///
    /// The in-memory session is always cleared, even when removing the
    /// persisted entries fails.
    pub fn logout(&self) -> Result<(), StorageError> {
        let _guard = self.inner.write_lock.lock();

        let persisted = self.inner.storage.load().and_then(|mut entries| {
            for key in [TOKEN_KEY, USER_ID_KEY, ROLE_KEY] {
                entries.remove(key);
            }
            self.inner.storage.save(&entries)
        });

        info!("Session cleared");
        self.publish(None);
        persisted
    }

    fn publish(&self, session: Option<Session>) {
        self.inner.current.store(session.clone().map(Arc::new));
        self.inner.changes.send_replace(session);
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current())
            .finish()
    }
}

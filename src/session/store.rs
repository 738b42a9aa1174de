use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::models::Session;

/// In-memory sessions keyed by the id carried in the session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        // Critical sections never leave a session half updated.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` against the session, creating it first if it does not exist.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> R,
    ) -> R {
        let mut sessions = self.lock();
        let session = sessions.entry(id).or_insert_with(|| {
            debug!("Creating session {}", id);
            Session::new(now)
        });
        f(session)
    }

    pub fn get_or_init(&self, id: Uuid, now: DateTime<Utc>) -> Session {
        self.with_session(id, now, |session| session.clone())
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.lock().get(&id).cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<Session> {
        self.lock().remove(&id)
    }

    /// Drops every session that has been idle longer than `timeout`.
    pub fn purge_idle(&self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, timeout));
        let purged = before - sessions.len();
        if purged > 0 {
            info!("Purged {} idle sessions", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

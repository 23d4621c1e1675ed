//! In-memory store of per-user wizard sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;
use wellplan_rs::wizard::SessionState;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Generate an unguessable session id.
pub fn generate_session_id() -> String {
    format!("ws-{}", Uuid::new_v4().simple())
}

struct Entry {
    state: SessionState,
    touched: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.touched) > ttl
    }
}

/// Sessions keyed by id. Each [`SessionState`] belongs to exactly one id.
///
/// The lock is only held for synchronous reads and writes, never across an
/// `.await`. Every access refreshes a session; sessions idle for longer than
/// the TTL behave as if they were deleted.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a fresh session and return its id. Expired sessions are swept
    /// first.
    pub fn create(&self) -> String {
        let id = generate_session_id();
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.idle_ttl));
        if sessions.len() < before {
            debug!("Evicted {} idle session(s)", before - sessions.len());
        }
        sessions.insert(
            id.clone(),
            Entry {
                state: SessionState::new(),
                touched: now,
            },
        );
        id
    }

    /// Run `f` against the session, if it exists and has not expired.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let now = Instant::now();
        let mut sessions = self.lock();
        if sessions
            .get(id)
            .is_some_and(|entry| entry.is_expired(now, self.idle_ttl))
        {
            sessions.remove(id);
            debug!("Session {id} expired");
            return None;
        }
        let entry = sessions.get_mut(id)?;
        entry.touched = now;
        Some(f(&mut entry.state))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Number of stored sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

//! Session-keyed state that survives view reconstruction.
//!
//! The map lock is only held long enough to find or create an entry; each
//! session then has its own lock so cycles of different sessions never wait
//! on each other while cycles of the same session are serialized.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pqa_model::{SessionDefaults, SessionId, SessionState};

type Entry = Arc<Mutex<SessionState>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store of per-session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &SessionId, defaults: &SessionDefaults) -> Entry {
        let mut sessions = lock(&self.sessions);
        Arc::clone(sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "creating session");
            Arc::new(Mutex::new(SessionState::from_defaults(defaults)))
        }))
    }

    fn existing(&self, id: &SessionId) -> Option<Entry> {
        lock(&self.sessions).get(id).map(Arc::clone)
    }

    /// Returns a snapshot of the session, creating it from `defaults` first
    /// if needed.
    pub fn get_or_create(&self, id: &SessionId, defaults: &SessionDefaults) -> SessionState {
        lock(&self.entry(id, defaults)).clone()
    }

    /// Applies `apply` to an existing session under its lock.
    ///
    /// Returns `None` when the session does not exist.
    pub fn update<R>(&self, id: &SessionId, apply: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let entry = self.existing(id)?;
        let mut state = lock(&entry);
        Some(apply(&mut state))
    }

    /// Runs `f` under the session lock, creating the session if needed.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        defaults: &SessionDefaults,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> R {
        let entry = self.entry(id, defaults);
        let mut state = lock(&entry);
        f(&mut state)
    }

    /// Ends a session and returns its last state.
    pub fn remove(&self, id: &SessionId) -> Option<SessionState> {
        let entry = lock(&self.sessions).remove(id)?;
        let state = lock(&entry).clone();
        Some(state)
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

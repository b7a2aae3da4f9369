//! In-memory adapters
//!
//! `SessionStore` and `AuditSink` implementations that never touch disk.
//! Used by embedders that keep state elsewhere and by the test suites.

use std::sync::{Mutex, MutexGuard};

use crate::core::models::{AuditEvent, SessionState};
use crate::core::ports::{AuditSink, SessionStore};
use crate::error::EnforcerError;

fn locked<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, EnforcerError> {
    mutex
        .lock()
        .map_err(|_| EnforcerError::storage(format!("<memory {what}>"), "lock poisoned"))
}

/// Session store held in a mutex
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    /// Store seeded with `state`
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState, EnforcerError> {
        Ok(locked(&self.state, "session")?.clone())
    }

    fn update<T, F>(&self, op: F) -> Result<T, EnforcerError>
    where
        F: FnOnce(&mut SessionState) -> Result<T, EnforcerError>,
    {
        let mut guard = locked(&self.state, "session")?;
        let mut draft = guard.clone();
        let value = op(&mut draft)?;
        draft.touch();
        *guard = draft;
        Ok(value)
    }
}

/// Audit sink held in a mutex
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    /// Empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append_all(&self, batch: Vec<AuditEvent>) -> Result<Vec<AuditEvent>, EnforcerError> {
        let mut events = locked(&self.events, "audit")?;
        let next = events.last().map_or(1, |e| e.seq + 1);
        let appended: Vec<AuditEvent> = (next..)
            .zip(batch)
            .map(|(seq, mut event)| {
                event.seq = seq;
                event
            })
            .collect();
        events.extend(appended.iter().cloned());
        Ok(appended)
    }

    fn events(&self) -> Result<Vec<AuditEvent>, EnforcerError> {
        Ok(locked(&self.events, "audit")?.clone())
    }
}

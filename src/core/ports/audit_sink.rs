//! Audit sink port
//!
//! Defines where audit events go.

use crate::core::models::AuditEvent;
use crate::error::EnforcerError;

/// Append-only destination for audit events
///
/// Events are never rewritten or removed. The sink assigns sequence
/// numbers so the order of events equals the order of appends.
pub trait AuditSink: Send + Sync {
    /// Append events as one write, returning them with sequence numbers set
    ///
    /// Either every event is appended or none is.
    fn append_all(&self, events: Vec<AuditEvent>) -> Result<Vec<AuditEvent>, EnforcerError>;

    /// Append a single event
    fn append(&self, event: AuditEvent) -> Result<AuditEvent, EnforcerError> {
        self.append_all(vec![event])?
            .pop()
            .ok_or_else(|| EnforcerError::storage("<audit>", "append returned no event"))
    }

    /// All events in append order
    fn events(&self) -> Result<Vec<AuditEvent>, EnforcerError>;

    /// Events concerning one task
    fn events_for_task(&self, task_id: &str) -> Result<Vec<AuditEvent>, EnforcerError> {
        Ok(self
            .events()?
            .into_iter()
            .filter(|e| e.task_id.as_deref() == Some(task_id))
            .collect())
    }
}

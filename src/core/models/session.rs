//! Session state - the aggregate root
//!
//! Exactly one `SessionState` is live per project. It is only ever mutated
//! inside a store transaction; see `core::ports::SessionStore`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Task, TaskStatus, WorkLogRecord};
use crate::error::EnforcerError;

/// All tasks, assignments, requirements and work logs for one project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Identifier of the current session
    pub session_id: String,

    /// Human-readable project name
    pub project_name: String,

    /// When the state was last written (RFC3339)
    pub last_updated: String,

    /// Every declared task, keyed by id
    pub tasks: BTreeMap<String, Task>,

    /// Ids of completed tasks
    pub completed: BTreeSet<String>,

    /// Assignee -> ids of tasks they hold or completed
    pub assignments: BTreeMap<String, BTreeSet<String>>,

    /// Task id or glob pattern -> required evidence categories
    pub validation_requirements: BTreeMap<String, Vec<String>>,

    /// Submitted work logs, keyed by task id
    pub work_logs: BTreeMap<String, WorkLogRecord>,

    /// Top-level fields written by other tools, preserved on rewrite
    pub extra: Map<String, Value>,
}

/// A single applied status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Task that changed
    pub task_id: String,
    /// Status before
    pub from: TaskStatus,
    /// Status after
    pub to: TaskStatus,
}

impl SessionState {
    /// Create an empty session for a project
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            session_id: format!("session-{}", now.format("%Y%m%d-%H%M%S")),
            project_name: project_name.into(),
            last_updated: now.to_rfc3339(),
            ..Self::default()
        }
    }

    /// Look up a task, failing with `InvalidTask` if unknown
    pub fn task(&self, id: &str) -> Result<&Task, EnforcerError> {
        self.tasks.get(id).ok_or_else(|| EnforcerError::unknown_task(id))
    }

    /// Mutable lookup, failing with `InvalidTask` if unknown
    pub fn task_mut(&mut self, id: &str) -> Result<&mut Task, EnforcerError> {
        self.tasks.get_mut(id).ok_or_else(|| EnforcerError::unknown_task(id))
    }

    /// The task currently selected or in progress for `identity`
    #[must_use]
    pub fn active_for(&self, identity: &str) -> Option<&Task> {
        self.tasks.values().find(|t| t.is_held_by(identity) && t.status.is_active())
    }

    /// Dependencies of `task` that are not complete (unknown ids count as unmet)
    #[must_use]
    pub fn unmet_dependencies(&self, task: &Task) -> Vec<String> {
        task.depends_on.iter().filter(|dep| !self.completed.contains(*dep)).cloned().collect()
    }

    /// Record `identity` as the holder of `task_id`
    pub fn assign(&mut self, task_id: &str, identity: &str) -> Result<(), EnforcerError> {
        let task = self.task_mut(task_id)?;
        task.assignee = Some(identity.to_string());
        self.assignments.entry(identity.to_string()).or_default().insert(task_id.to_string());
        Ok(())
    }

    /// Clear the holder of `task_id`, dropping it from the assignee's set
    pub fn unassign(&mut self, task_id: &str) -> Result<(), EnforcerError> {
        let task = self.task_mut(task_id)?;
        if let Some(previous) = task.assignee.take()
            && let Some(ids) = self.assignments.get_mut(&previous)
        {
            ids.remove(task_id);
            if ids.is_empty() {
                self.assignments.remove(&previous);
            }
        }
        Ok(())
    }

    /// Whether a complete work log exists for the task
    #[must_use]
    pub fn work_log_open(&self, task_id: &str) -> bool {
        self.work_logs.get(task_id).is_some_and(|log| log.complete)
    }

    /// Stamp the state as written now
    pub fn touch(&mut self) {
        self.last_updated = chrono::Utc::now().to_rfc3339();
    }
}

impl Transition {
    /// Whether this change moves the task backwards in its lifecycle
    #[must_use]
    pub const fn is_regression(&self) -> bool {
        matches!(
            (self.from, self.to),
            (TaskStatus::Selected | TaskStatus::InProgress, TaskStatus::Pending)
                | (
                    TaskStatus::CompletionRequested,
                    TaskStatus::RevisionRequested | TaskStatus::Rejected
                )
                | (TaskStatus::RevisionRequested, TaskStatus::InProgress)
                | (TaskStatus::Rejected, TaskStatus::Pending)
        )
    }
}

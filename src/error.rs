//! Error taxonomy for enforcement operations
//!
//! Every variant except [`EnforcerError::Storage`] and [`EnforcerError::Config`] is
//! recoverable from the caller's side: correct the input and retry. Storage failures
//! mean the state file or audit log could not be read or written and are surfaced
//! verbatim.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::TaskStatus;

/// Errors returned by the enforcer and its stores
#[derive(Debug, Error)]
pub enum EnforcerError {
    /// Unknown task id, or a task not in a state the operation accepts
    #[error("invalid task {task_id}: {reason}")]
    InvalidTask {
        /// The offending task id
        task_id: String,
        /// Why the task was refused
        reason: String,
    },

    /// Another assignee holds the task (or the caller already holds another task)
    #[error("task {task_id} is already assigned to {holder}")]
    AlreadyAssigned {
        /// The task that was requested
        task_id: String,
        /// Who currently holds it
        holder: String,
    },

    /// One or more dependencies are not complete
    #[error("task {task_id} has unmet dependencies: {}", unmet.join(", "))]
    DependencyUnmet {
        /// The blocked task
        task_id: String,
        /// Dependencies that are not complete
        unmet: Vec<String>,
    },

    /// The state machine does not allow this edge
    #[error("illegal transition for {task_id}: {from} -> {to}")]
    IllegalTransition {
        /// The task being transitioned
        task_id: String,
        /// Current status
        from: TaskStatus,
        /// Requested status
        to: TaskStatus,
    },

    /// Work log has blank required fields
    #[error("work log for {task_id} is incomplete; missing: {}", missing.join(", "))]
    IncompleteWorkLog {
        /// Task the work log belongs to
        task_id: String,
        /// Names of blank or absent fields
        missing: Vec<String>,
    },

    /// Justification too short, empty, or unrelated to the task
    #[error("insufficient justification: {reason}")]
    InsufficientJustification {
        /// Human-readable reason
        reason: String,
    },

    /// No active task, work log gate closed, or a rule blocked the action
    #[error("action blocked: {reason}")]
    BlockedAction {
        /// Human-readable reason
        reason: String,
        /// Items the caller must supply before retrying
        missing: Vec<String>,
    },

    /// Required evidence categories absent from the proof package
    #[error("missing evidence for {task_id}: {}", missing.join(", "))]
    MissingEvidence {
        /// Task whose completion was requested
        task_id: String,
        /// Missing or blank categories
        missing: Vec<String>,
    },

    /// External re-verification of evidence failed or timed out
    #[error("verification failed for {category}: {reason}")]
    VerificationFailed {
        /// Evidence category that failed
        category: String,
        /// Failure detail, including captured output
        reason: String,
    },

    /// The pending decision was already made
    #[error("task {task_id} is already resolved ({status})")]
    AlreadyResolved {
        /// Task the decision targeted
        task_id: String,
        /// Status the task already has
        status: TaskStatus,
    },

    /// The store lock could not be acquired in time
    #[error("timed out after {waited_ms}ms waiting for lock {}", path.display())]
    LockTimeout {
        /// Lock file path
        path: PathBuf,
        /// How long the caller waited
        waited_ms: u64,
    },

    /// Unreadable or corrupt persisted state
    #[error("storage failure at {}: {message}", path.display())]
    Storage {
        /// File that failed
        path: PathBuf,
        /// Underlying error text
        message: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Serializable discriminant of [`EnforcerError`], carried in validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`EnforcerError::InvalidTask`]
    InvalidTask,
    /// See [`EnforcerError::AlreadyAssigned`]
    AlreadyAssigned,
    /// See [`EnforcerError::DependencyUnmet`]
    DependencyUnmet,
    /// See [`EnforcerError::IllegalTransition`]
    IllegalTransition,
    /// See [`EnforcerError::IncompleteWorkLog`]
    IncompleteWorkLog,
    /// See [`EnforcerError::InsufficientJustification`]
    InsufficientJustification,
    /// See [`EnforcerError::BlockedAction`]
    BlockedAction,
    /// See [`EnforcerError::MissingEvidence`]
    MissingEvidence,
    /// See [`EnforcerError::VerificationFailed`]
    VerificationFailed,
    /// See [`EnforcerError::AlreadyResolved`]
    AlreadyResolved,
    /// See [`EnforcerError::LockTimeout`]
    LockTimeout,
    /// See [`EnforcerError::Storage`]
    Storage,
    /// See [`EnforcerError::Config`]
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidTask => "invalid_task",
            Self::AlreadyAssigned => "already_assigned",
            Self::DependencyUnmet => "dependency_unmet",
            Self::IllegalTransition => "illegal_transition",
            Self::IncompleteWorkLog => "incomplete_work_log",
            Self::InsufficientJustification => "insufficient_justification",
            Self::BlockedAction => "blocked_action",
            Self::MissingEvidence => "missing_evidence",
            Self::VerificationFailed => "verification_failed",
            Self::AlreadyResolved => "already_resolved",
            Self::LockTimeout => "lock_timeout",
            Self::Storage => "storage",
            Self::Config => "config",
        };
        f.write_str(name)
    }
}

impl EnforcerError {
    /// Build a storage error from any displayable cause
    pub fn storage(path: impl Into<PathBuf>, cause: impl std::fmt::Display) -> Self {
        Self::Storage {
            path: path.into(),
            message: cause.to_string(),
        }
    }

    /// Shorthand for an unknown task id
    pub fn unknown_task(task_id: &str) -> Self {
        Self::InvalidTask {
            task_id: task_id.to_string(),
            reason: "no such task".to_string(),
        }
    }

    /// The serializable kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTask { .. } => ErrorKind::InvalidTask,
            Self::AlreadyAssigned { .. } => ErrorKind::AlreadyAssigned,
            Self::DependencyUnmet { .. } => ErrorKind::DependencyUnmet,
            Self::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            Self::IncompleteWorkLog { .. } => ErrorKind::IncompleteWorkLog,
            Self::InsufficientJustification { .. } => ErrorKind::InsufficientJustification,
            Self::BlockedAction { .. } => ErrorKind::BlockedAction,
            Self::MissingEvidence { .. } => ErrorKind::MissingEvidence,
            Self::VerificationFailed { .. } => ErrorKind::VerificationFailed,
            Self::AlreadyResolved { .. } => ErrorKind::AlreadyResolved,
            Self::LockTimeout { .. } => ErrorKind::LockTimeout,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the caller can fix the input and retry
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage { .. } | Self::Config(_))
    }

    /// Items the caller must supply to self-correct (fields, categories, dependencies)
    #[must_use]
    pub fn missing_items(&self) -> &[String] {
        match self {
            Self::DependencyUnmet { unmet, .. } => unmet,
            Self::IncompleteWorkLog { missing, .. }
            | Self::BlockedAction { missing, .. }
            | Self::MissingEvidence { missing, .. } => missing,
            _ => &[],
        }
    }
}

//! Task model
//!
//! A task is a declared unit of work. Tasks can depend on other tasks
//! (`depends_on`), forming a directed graph; a task may not be selected or
//! completed while any dependency is incomplete.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RiskTier;

/// A task - a unit of work an agent must select before acting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, stable identifier
    pub id: String,

    /// What needs to be done
    #[serde(default)]
    pub description: String,

    /// Current lifecycle status
    #[serde(default)]
    pub status: TaskStatus,

    /// Identity currently holding the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Task IDs that must be complete first
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,

    /// Priority level (p0 = critical, p3 = low)
    #[serde(default)]
    pub priority: Priority,

    /// Risk tier derived from the id and description
    ///
    /// `None` for tasks recorded without one; those are classified when read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tier: Option<RiskTier>,

    /// When this task was declared (RFC3339)
    #[serde(default)]
    pub created_at: String,

    /// When this task last changed (RFC3339)
    #[serde(default)]
    pub updated_at: String,

    /// Fields written by other tools, preserved on rewrite
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Declared but not selected by anyone
    #[default]
    Pending,
    /// Claimed by exactly one assignee
    Selected,
    /// Work log satisfied, accepting actions
    InProgress,
    /// Proof submitted, awaiting a decision
    CompletionRequested,
    /// Done (terminal)
    Complete,
    /// Reviewer asked for more work; returns to in-progress
    RevisionRequested,
    /// Reviewer refused the completion; returns to pending
    Rejected,
    /// Waiting on an incomplete dependency
    Blocked,
}

impl TaskStatus {
    /// Whether the task accepts actions in this status
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Selected | Self::InProgress)
    }

    /// Whether this status ends the lifecycle
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Selected => write!(f, "selected"),
            Self::InProgress => write!(f, "in_progress"),
            Self::CompletionRequested => write!(f, "completion_requested"),
            Self::Complete => write!(f, "complete"),
            Self::RevisionRequested => write!(f, "revision_requested"),
            Self::Rejected => write!(f, "rejected"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "selected" => Ok(Self::Selected),
            "in_progress" | "inprogress" | "started" => Ok(Self::InProgress),
            "completion_requested" | "review" => Ok(Self::CompletionRequested),
            "complete" | "completed" | "done" => Ok(Self::Complete),
            "revision_requested" => Ok(Self::RevisionRequested),
            "rejected" => Ok(Self::Rejected),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!(
                "Invalid status: {s}. Use: pending, selected, in_progress, \
                 completion_requested, complete, blocked"
            )),
        }
    }
}

/// Task priority (p0 = most critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Critical - must be done immediately
    P0,
    /// High priority (default)
    #[default]
    P1,
    /// Medium priority
    P2,
    /// Low priority
    P3,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P0 => write!(f, "p0"),
            Self::P1 => write!(f, "p1"),
            Self::P2 => write!(f, "p2"),
            Self::P3 => write!(f, "p3"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p0" | "0" | "critical" => Ok(Self::P0),
            "p1" | "1" | "high" => Ok(Self::P1),
            "p2" | "2" | "medium" | "med" => Ok(Self::P2),
            "p3" | "3" | "low" => Ok(Self::P3),
            _ => Err(format!("Invalid priority: {s}. Use: p0, p1, p2, p3 (or 0-3)")),
        }
    }
}

/// Input for declaring a new task
#[derive(Debug, Clone, Default)]
pub struct TaskSpec {
    /// Unique identifier
    pub id: String,
    /// What needs to be done
    pub description: String,
    /// Priority level
    pub priority: Priority,
    /// Tasks that must complete first
    pub depends_on: Vec<String>,
}

impl TaskSpec {
    /// Create a spec with default priority and no dependencies
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Add dependencies
    #[must_use]
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Set priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl Task {
    /// Create a pending task with the given description
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>, risk_tier: RiskTier) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::default(),
            assignee: None,
            depends_on: BTreeSet::new(),
            priority: Priority::default(),
            risk_tier: Some(risk_tier),
            created_at: now.clone(),
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// Create a pending task with no tier yet
    #[must_use]
    pub fn unclassified(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            risk_tier: None,
            ..Self::new(id, description, RiskTier::default())
        }
    }

    /// Create a pending, not yet classified task from a declaration
    #[must_use]
    pub fn from_spec(spec: TaskSpec) -> Self {
        let mut task = Self::unclassified(spec.id, spec.description);
        task.priority = spec.priority;
        task.depends_on = spec.depends_on.into_iter().collect();
        task
    }

    /// Text used for keyword overlap and risk classification (id plus description)
    #[must_use]
    pub fn subject(&self) -> String {
        if self.description.is_empty() || self.description == self.id {
            self.id.clone()
        } else {
            format!("{} {}", self.id, self.description)
        }
    }

    /// Whether `identity` currently holds this task
    #[must_use]
    pub fn is_held_by(&self, identity: &str) -> bool {
        self.assignee.as_deref() == Some(identity)
    }

    /// Mark the task as modified now
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

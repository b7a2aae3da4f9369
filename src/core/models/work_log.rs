//! Work log model
//!
//! A work log records what the agent intends to do and how it will be validated.
//! A task cannot move from selected to in-progress until a complete work log has
//! been submitted for it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Names of the fields that must be non-blank, in display order
pub const REQUIRED_WORK_LOG_FIELDS: [&str; 6] = [
    "task_id",
    "attempted",
    "expected",
    "actual",
    "files_touched",
    "validation_command",
];

/// A submitted work log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLogRecord {
    /// Task this log belongs to
    pub task_id: String,

    /// What was attempted (or is about to be)
    #[serde(default)]
    pub attempted: String,

    /// Expected result
    #[serde(default)]
    pub expected: String,

    /// Actual result
    #[serde(default)]
    pub actual: String,

    /// Files created or modified
    #[serde(default)]
    pub files_touched: Vec<String>,

    /// Command used to validate the step
    #[serde(default)]
    pub validation_command: String,

    /// Items checked before starting
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_work_checklist: Vec<String>,

    /// Items checked at the end
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_checklist: Vec<String>,

    /// Set once every required field is present
    #[serde(default)]
    pub complete: bool,

    /// When the log was accepted (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

impl WorkLogRecord {
    /// Start an empty record for a task
    #[must_use]
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            ..Self::default()
        }
    }

    /// Required fields that are empty or whitespace-only
    #[must_use]
    pub fn missing_fields(&self) -> Vec<String> {
        let blank = |s: &str| s.trim().is_empty();
        let files_blank = self.files_touched.iter().all(|f| blank(f));

        REQUIRED_WORK_LOG_FIELDS
            .iter()
            .filter(|field| match **field {
                "task_id" => blank(&self.task_id),
                "attempted" => blank(&self.attempted),
                "expected" => blank(&self.expected),
                "actual" => blank(&self.actual),
                "files_touched" => files_blank,
                "validation_command" => blank(&self.validation_command),
                _ => false,
            })
            .map(|field| (*field).to_string())
            .collect()
    }
}

/// What a caller needs to open a closed gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkLogTemplate {
    /// Task the log is for
    pub task_id: String,
    /// Fields that must be filled in
    pub required_fields: Vec<String>,
    /// Where the artifact should be written
    pub suggested_path: PathBuf,
    /// Markdown skeleton to fill in
    pub markdown: String,
}

/// State of the work-log gate for a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum WorkLogGate {
    /// A complete work log exists; actions may proceed
    Open,
    /// No complete work log; the template lists everything required
    Closed(Box<WorkLogTemplate>),
}

impl WorkLogGate {
    /// Whether actions may proceed
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

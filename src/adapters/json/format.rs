//! On-disk layout of `SESSION_STATE.json`
//!
//! The file is shared with other tools, so every field this crate does not
//! know about is carried through a rewrite untouched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::models::{SessionState, Task, TaskStatus, WorkLogRecord};

/// Top-level document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    current_session_id: String,
    #[serde(default)]
    last_updated: String,
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    active_tasks: Vec<TaskEntry>,
    #[serde(default)]
    completed_tasks: Vec<String>,
    #[serde(default)]
    team_assignments: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    validation_requirements: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    work_logs: BTreeMap<String, WorkLogRecord>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A task is either a full descriptor or just its id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TaskEntry {
    Id(String),
    Task(Box<Task>),
}

impl StateFile {
    /// Convert into the domain aggregate
    #[must_use]
    pub fn into_state(self) -> SessionState {
        let completed: BTreeSet<String> = self.completed_tasks.into_iter().collect();

        let mut tasks = BTreeMap::new();
        for entry in self.active_tasks {
            let task = match entry {
                TaskEntry::Task(task) => *task,
                TaskEntry::Id(id) => {
                    let mut task = Task::unclassified(id.clone(), id);
                    if completed.contains(&task.id) {
                        task.status = TaskStatus::Complete;
                    }
                    task
                }
            };
            if tasks.contains_key(&task.id) {
                log::warn!("duplicate task entry {} in state file; keeping the last", task.id);
            }
            tasks.insert(task.id.clone(), task);
        }

        SessionState {
            session_id: self.current_session_id,
            project_name: self.project_name,
            last_updated: self.last_updated,
            tasks,
            completed,
            assignments: self
                .team_assignments
                .into_iter()
                .map(|(who, ids)| (who, ids.into_iter().collect()))
                .collect(),
            validation_requirements: self.validation_requirements,
            work_logs: self.work_logs,
            extra: self.extra,
        }
    }

    /// Build the document for a state
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        Self {
            current_session_id: state.session_id.clone(),
            last_updated: state.last_updated.clone(),
            project_name: state.project_name.clone(),
            active_tasks: state
                .tasks
                .values()
                .map(|t| TaskEntry::Task(Box::new(t.clone())))
                .collect(),
            completed_tasks: state.completed.iter().cloned().collect(),
            team_assignments: state
                .assignments
                .iter()
                .map(|(who, ids)| (who.clone(), ids.iter().cloned().collect()))
                .collect(),
            validation_requirements: state.validation_requirements.clone(),
            work_logs: state.work_logs.clone(),
            extra: state.extra.clone(),
        }
    }
}

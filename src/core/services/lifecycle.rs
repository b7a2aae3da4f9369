//! Task state machine
//!
//! The only place task status changes. Every edge is checked against
//! [`allowed_targets`] before the task is touched.

use crate::core::models::{SessionState, TaskStatus, Transition};
use crate::error::EnforcerError;

/// Statuses reachable from `from` in one step
#[must_use]
pub const fn allowed_targets(from: TaskStatus) -> &'static [TaskStatus] {
    use TaskStatus::{
        Blocked, Complete, CompletionRequested, InProgress, Pending, Rejected, RevisionRequested,
        Selected,
    };
    match from {
        Pending => &[Selected, Blocked],
        Selected => &[InProgress, Pending, Blocked],
        InProgress => &[CompletionRequested, Pending, Blocked],
        CompletionRequested => &[Complete, RevisionRequested, Rejected],
        RevisionRequested => &[InProgress],
        Rejected => &[Pending],
        Blocked => &[Pending],
        Complete => &[],
    }
}

/// Whether `from -> to` is a legal edge
#[must_use]
pub fn is_legal(from: TaskStatus, to: TaskStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Move a task to `to`, validating the edge first
///
/// Moving to `Complete` also requires every dependency to be complete and
/// records the id in the completed set. On error the state is untouched.
pub fn transition(
    state: &mut SessionState,
    task_id: &str,
    to: TaskStatus,
) -> Result<Transition, EnforcerError> {
    let task = state.task(task_id)?;
    let from = task.status;
    if !is_legal(from, to) {
        return Err(EnforcerError::IllegalTransition {
            task_id: task_id.to_string(),
            from,
            to,
        });
    }
    if to == TaskStatus::Complete {
        let unmet = state.unmet_dependencies(task);
        if !unmet.is_empty() {
            return Err(EnforcerError::DependencyUnmet {
                task_id: task_id.to_string(),
                unmet,
            });
        }
    }

    let task = state.task_mut(task_id)?;
    task.status = to;
    task.touch();
    if to == TaskStatus::Complete {
        state.completed.insert(task_id.to_string());
    }
    log::debug!("{task_id}: {from} -> {to}");

    Ok(Transition {
        task_id: task_id.to_string(),
        from,
        to,
    })
}

/// Apply a sequence of edges, stopping at the first illegal one
///
/// Callers run this inside a store transaction, so a failure part-way
/// through discards the earlier hops as well.
pub fn transition_path(
    state: &mut SessionState,
    task_id: &str,
    path: &[TaskStatus],
) -> Result<Vec<Transition>, EnforcerError> {
    path.iter().map(|to| transition(state, task_id, *to)).collect()
}

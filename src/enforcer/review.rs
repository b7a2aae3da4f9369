//! Human decisions on pending completions

use super::{Caller, Enforcer, transition_events};
use crate::core::models::{AuditEvent, TaskStatus, Transition, ValidationResult, ValidationStatus};
use crate::core::ports::{AuditSink, SessionStore};
use crate::core::services::lifecycle;
use crate::error::EnforcerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Approve,
    Revise,
    Reject,
}

impl Resolution {
    const fn action(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Revise => "request_revision",
            Self::Reject => "reject",
        }
    }

    const fn path(self) -> &'static [TaskStatus] {
        match self {
            Self::Approve => &[TaskStatus::Complete],
            Self::Revise => &[TaskStatus::RevisionRequested, TaskStatus::InProgress],
            Self::Reject => &[TaskStatus::Rejected, TaskStatus::Pending],
        }
    }

    fn result(self, task_id: &str, note: &str) -> ValidationResult {
        let status = match self {
            Self::Approve => ValidationStatus::Approved,
            Self::Revise | Self::Reject => ValidationStatus::Rejected,
        };
        let reason = match (self, note.trim().is_empty()) {
            (Self::Approve, true) => format!("completion of {task_id} approved"),
            (Self::Revise, true) => format!("revision requested for {task_id}"),
            (Self::Reject, true) => format!("completion of {task_id} rejected"),
            (_, false) => note.trim().to_string(),
        };
        ValidationResult::new(status, reason)
    }
}

impl<S: SessionStore, A: AuditSink> Enforcer<S, A> {
    /// Approve a pending completion
    ///
    /// Dependencies are checked again; an unmet one fails with
    /// `DependencyUnmet` and leaves the request pending.
    pub fn approve_pending(
        &self,
        reviewer: &Caller,
        task_id: &str,
        note: &str,
    ) -> Result<ValidationResult, EnforcerError> {
        self.resolve(reviewer, task_id, note, Resolution::Approve)
    }

    /// Send a pending completion back to the holder; the work log is kept
    pub fn request_revision(
        &self,
        reviewer: &Caller,
        task_id: &str,
        note: &str,
    ) -> Result<ValidationResult, EnforcerError> {
        self.resolve(reviewer, task_id, note, Resolution::Revise)
    }

    /// Reject a pending completion, returning the task to the pool
    pub fn reject_pending(
        &self,
        reviewer: &Caller,
        task_id: &str,
        reason: &str,
    ) -> Result<ValidationResult, EnforcerError> {
        self.resolve(reviewer, task_id, reason, Resolution::Reject)
    }

    fn resolve(
        &self,
        reviewer: &Caller,
        task_id: &str,
        note: &str,
        resolution: Resolution,
    ) -> Result<ValidationResult, EnforcerError> {
        let action = resolution.action();
        let resolved = self.store.update(|state| {
            let task = state.task(task_id)?;
            let holder = task.assignee.clone();
            match task.status {
                TaskStatus::CompletionRequested => {}
                status @ (TaskStatus::Complete | TaskStatus::Pending) => {
                    return Err(EnforcerError::AlreadyResolved {
                        task_id: task_id.to_string(),
                        status,
                    });
                }
                from => {
                    return Err(EnforcerError::IllegalTransition {
                        task_id: task_id.to_string(),
                        from,
                        to: resolution.path()[0],
                    });
                }
            }
            let hops: Vec<Transition> = lifecycle::transition_path(state, task_id, resolution.path())?;
            if resolution == Resolution::Reject {
                state.unassign(task_id)?;
                state.work_logs.remove(task_id);
            }

            let result = resolution
                .result(task_id, note)
                .for_task(task_id, Some(note))
                .with_reviewer(reviewer.identity());
            let mut events = vec![AuditEvent::from_result(reviewer.identity(), action, &result)];
            events.extend(transition_events(reviewer, action, &hops));
            self.commit_events(events)?;
            Ok((result, holder))
        });
        let (result, holder) = self.or_audit_failure(reviewer, action, task_id, resolved)?;

        log::info!(
            "{reviewer} {action} {task_id} (held by {}): {}",
            holder.as_deref().unwrap_or("nobody"),
            result.reason()
        );
        Ok(result)
    }
}

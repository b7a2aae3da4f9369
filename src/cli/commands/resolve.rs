//! Reviewer decisions on pending completions

use taskwarden::Caller;
use taskwarden::output::{OutputMode, ValidationReport};

use crate::cli::app::ResolveAction;

/// Approve, revise or reject a pending completion
///
/// The caller's identity is recorded as the reviewer.
pub fn resolve(action: ResolveAction, reviewer: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    let (operation, result) = match action {
        ResolveAction::Approve { id, reason } => {
            ("approve", enforcer.approve_pending(reviewer, &id, &reason)?)
        }
        ResolveAction::Revise { id, reason } => {
            ("request_revision", enforcer.request_revision(reviewer, &id, &reason)?)
        }
        ResolveAction::Reject { id, reason } => {
            ("reject", enforcer.reject_pending(reviewer, &id, &reason)?)
        }
    };
    let report = ValidationReport::new(operation, result);
    report.render(mode);
    // The decision itself succeeded; the result status describes the task.
    Ok(0)
}

//! Completion requests
//!
//! Evidence is checked and re-verified against a snapshot before the store
//! lock is taken, so slow verification commands never hold up other
//! callers. The transaction then re-checks that the task is still eligible
//! before routing it.

use super::{Caller, Enforcer, transition_events};
use crate::core::models::{
    AuditEvent, CompletionRequirements, ProofPackage, TaskStatus, ValidationResult,
    ValidationStatus,
};
use crate::core::ports::{AuditSink, SessionStore};
use crate::core::services::lifecycle;
use crate::error::EnforcerError;

const REQUEST_COMPLETION: &str = "request_completion";

impl<S: SessionStore, A: AuditSink> Enforcer<S, A> {
    /// Evidence categories a task must prove, with where they came from
    pub fn completion_requirements(
        &self,
        task_id: &str,
    ) -> Result<CompletionRequirements, EnforcerError> {
        let state = self.state()?;
        let task = state.task(task_id)?;
        Ok(self.completion.requirements(&state, task))
    }

    /// Ask for a task to be marked complete
    ///
    /// Fails with `InvalidTask` unless the caller holds the task and it is in
    /// progress. Missing or unverifiable evidence is a rejected result and
    /// leaves the task in progress.
    pub fn request_completion(
        &self,
        caller: &Caller,
        task_id: &str,
        proof: &ProofPackage,
    ) -> Result<ValidationResult, EnforcerError> {
        let who = caller.identity();
        let snapshot = self.state()?;
        let eligible = self.completion.eligible_task(&snapshot, who, task_id);
        let task = self.or_audit_failure(caller, REQUEST_COMPLETION, task_id, eligible)?;
        let requirements = self.completion.requirements(&snapshot, task);
        log::debug!(
            "{task_id} requires {} ({})",
            requirements.categories.join(", "),
            requirements.source
        );

        let refused = self
            .completion
            .check_evidence(&requirements, proof)
            .or_else(|| self.completion.verify(&requirements, proof, self.verifier.as_ref()));
        if let Some(result) = refused {
            self.record(AuditEvent::from_result(who, REQUEST_COMPLETION, &result))?;
            log_completion(caller, &result);
            return Ok(result);
        }

        let routed = self.store.update(|state| {
            self.completion.eligible_task(state, who, task_id)?;
            let result = self.completion.route(state, &requirements, proof);
            let hops = match result.status() {
                ValidationStatus::Approved => lifecycle::transition_path(
                    state,
                    task_id,
                    &[TaskStatus::CompletionRequested, TaskStatus::Complete],
                )?,
                ValidationStatus::Pending => {
                    vec![lifecycle::transition(state, task_id, TaskStatus::CompletionRequested)?]
                }
                ValidationStatus::Rejected | ValidationStatus::Blocked => Vec::new(),
            };
            let mut events = vec![AuditEvent::from_result(who, REQUEST_COMPLETION, &result)];
            events.extend(transition_events(caller, REQUEST_COMPLETION, &hops));
            self.commit_events(events)?;
            Ok(result)
        });
        let result = self.or_audit_failure(caller, REQUEST_COMPLETION, task_id, routed)?;
        log_completion(caller, &result);
        Ok(result)
    }
}

fn log_completion(caller: &Caller, result: &ValidationResult) {
    log::info!(
        "{caller} requested completion of {}: {} ({})",
        result.task_id().unwrap_or_default(),
        result.status(),
        result.reason()
    );
}

//! Action validation

use super::{Caller, Enforcer};
use crate::core::models::{ActionRequest, AuditEvent, ValidationResult};
use crate::core::ports::{AuditSink, SessionStore};
use crate::core::services::summary::VALIDATE_ACTION;
use crate::error::EnforcerError;

impl<S: SessionStore, A: AuditSink> Enforcer<S, A> {
    /// Judge a proposed action and record the decision
    ///
    /// Refusals are results, not errors: only an unknown task id or a
    /// storage failure returns `Err`.
    pub fn validate_action(
        &self,
        caller: &Caller,
        request: &ActionRequest,
    ) -> Result<ValidationResult, EnforcerError> {
        let state = self.state()?;
        let evaluated = self.actions.evaluate(&state, caller.identity(), request);
        let result = self.or_audit_failure(caller, VALIDATE_ACTION, &request.task_id, evaluated)?;

        log::info!(
            "{caller} {}: {} ({})",
            request.task_id,
            result.status(),
            result.reason()
        );
        self.record(AuditEvent::from_result(caller.identity(), VALIDATE_ACTION, &result))?;
        Ok(result)
    }
}

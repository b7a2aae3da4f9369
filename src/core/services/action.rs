//! Action validation
//!
//! Decides whether a proposed action may proceed under the caller's task.
//! The decision is pure: it reads a session snapshot and returns a result.
//! Recording the result is the caller's job.

use crate::config::{Config, EnforcementLevel, JustificationConfig};
use crate::core::models::{
    ActionRequest, REQUIRED_WORK_LOG_FIELDS, RiskTier, SessionState, TaskStatus, ValidationResult,
    ValidationStatus, WorkLogRecord,
};
use crate::core::services::classifier::RiskClassifier;
use crate::core::services::justification;
use crate::core::services::rules::{RuleContext, RuleSet, ValidationRule, Verdict};
use crate::error::{EnforcerError, ErrorKind};

/// Everything needed to judge an action
#[derive(Debug)]
pub struct ActionPolicy {
    classifier: RiskClassifier,
    justification: JustificationConfig,
    level: EnforcementLevel,
    rules: RuleSet,
}

impl ActionPolicy {
    /// Build from configuration, compiling patterns and `[[rules]]`
    pub fn new(config: &Config) -> Result<Self, EnforcerError> {
        Ok(Self {
            classifier: RiskClassifier::new(&config.risk)?,
            justification: config.justification,
            level: config.enforcement.level,
            rules: RuleSet::from_config(&config.rules)?,
        })
    }

    /// Register a custom rule after the configured ones
    pub fn register_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.register(rule);
    }

    /// The risk classifier in use
    #[must_use]
    pub const fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Judge an action
    ///
    /// Fails only for an unknown task id; every other outcome is a result.
    pub fn evaluate(
        &self,
        state: &SessionState,
        caller: &str,
        request: &ActionRequest,
    ) -> Result<ValidationResult, EnforcerError> {
        let task = state.task(&request.task_id)?;
        let justification = request.justification.as_str();
        let blocked = |reason: String| {
            ValidationResult::blocked(reason).for_task(&task.id, Some(justification))
        };

        if matches!(task.status, TaskStatus::Complete | TaskStatus::Rejected) {
            return Ok(blocked(format!("task {} is no longer active ({})", task.id, task.status)));
        }
        if !task.is_held_by(caller) {
            let reason = match state.active_for(caller) {
                Some(active) => format!(
                    "{caller} is working on {}, not {}; select {} first",
                    active.id, task.id, task.id
                ),
                None => format!("{caller} has no active task; select {} first", task.id),
            };
            return Ok(blocked(reason));
        }
        if !task.status.is_active() {
            return Ok(blocked(format!(
                "task {} is {}; actions need a selected or in-progress task",
                task.id, task.status
            )));
        }
        if !state.work_log_open(&task.id) {
            let missing = state.work_logs.get(&task.id).map_or_else(
                || REQUIRED_WORK_LOG_FIELDS.map(String::from).to_vec(),
                WorkLogRecord::missing_fields,
            );
            return Ok(blocked(format!("work log required before acting on {}", task.id))
                .with_missing(missing));
        }

        let tier = self.classifier.classify_action(&request.action, task);

        if let Err(reason) = justification::check(justification, &task.subject(), &self.justification)
        {
            return Ok(ValidationResult::rejected(ErrorKind::InsufficientJustification, reason)
                .for_task(&task.id, Some(justification))
                .with_tier(tier));
        }

        let context = RuleContext {
            caller,
            task,
            tier,
        };
        if let Some((rule, verdict)) = self.rules.evaluate(request, &context) {
            let result = match verdict {
                Verdict::Reject(reason) => ValidationResult::new(ValidationStatus::Rejected, reason),
                Verdict::Block(reason) => ValidationResult::blocked(reason),
                Verdict::Escalate(reason) => self.route(ValidationResult::pending(reason)),
                Verdict::Approve => ValidationResult::approved("approved by rule"),
            };
            return Ok(result.for_task(&task.id, Some(justification)).with_tier(tier).with_rule(rule));
        }

        let result = if self.needs_review(tier) {
            ValidationResult::pending(format!("{tier}-risk action requires human review"))
        } else {
            ValidationResult::approved(format!("{tier}-risk action advances {}", task.id))
        };
        Ok(self.route(result).for_task(&task.id, Some(justification)).with_tier(tier))
    }

    fn needs_review(&self, tier: RiskTier) -> bool {
        match self.level {
            EnforcementLevel::Strict => tier >= RiskTier::Medium,
            EnforcementLevel::Moderate | EnforcementLevel::Permissive => tier == RiskTier::High,
        }
    }

    fn route(&self, result: ValidationResult) -> ValidationResult {
        if self.level == EnforcementLevel::Permissive && result.status() == ValidationStatus::Pending
        {
            ValidationResult::approved(format!("{} (auto-approved: permissive)", result.reason()))
        } else {
            result
        }
    }
}

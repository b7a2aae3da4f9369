//! Completion validation
//!
//! Checks a proof package against a task's completion requirements and
//! decides how the completion request is routed. Verification against an
//! external [`Verifier`] is a separate step so callers can run it without
//! holding the store lock.

use crate::config::{Config, EnforcementLevel, ProofConfig};
use crate::core::models::{
    CompletionRequirements, ProofPackage, RiskTier, SessionState, Task, TaskStatus,
    ValidationResult,
};
use crate::core::ports::Verifier;
use crate::core::services::classifier::RiskClassifier;
use crate::core::services::requirements;
use crate::error::{EnforcerError, ErrorKind};

/// Longest verifier output quoted in a rejection reason
const MAX_QUOTED_OUTPUT: usize = 2000;

/// Everything needed to judge a completion request
#[derive(Debug, Clone)]
pub struct CompletionPolicy {
    proof: ProofConfig,
    level: EnforcementLevel,
    classifier: RiskClassifier,
}

impl CompletionPolicy {
    /// Build from configuration, classifying tasks with `classifier`
    #[must_use]
    pub fn new(config: &Config, classifier: RiskClassifier) -> Self {
        Self {
            proof: config.proof.clone(),
            level: config.enforcement.level,
            classifier,
        }
    }

    /// Requirements for a task in this session
    #[must_use]
    pub fn requirements(&self, state: &SessionState, task: &Task) -> CompletionRequirements {
        requirements::completion_requirements(
            task,
            self.classifier.task_tier(task),
            &state.validation_requirements,
            &self.proof.defaults,
        )
    }

    /// The task, if `caller` may request its completion
    pub fn eligible_task<'a>(
        &self,
        state: &'a SessionState,
        caller: &str,
        task_id: &str,
    ) -> Result<&'a Task, EnforcerError> {
        let task = state.task(task_id)?;
        if task.status != TaskStatus::InProgress {
            return Err(EnforcerError::InvalidTask {
                task_id: task_id.to_string(),
                reason: format!("completion needs an in-progress task; it is {}", task.status),
            });
        }
        if !task.is_held_by(caller) {
            return Err(EnforcerError::InvalidTask {
                task_id: task_id.to_string(),
                reason: format!("{caller} does not hold this task"),
            });
        }
        Ok(task)
    }

    /// Rejection for absent or blank categories, if any
    #[must_use]
    pub fn check_evidence(
        &self,
        requirements: &CompletionRequirements,
        proof: &ProofPackage,
    ) -> Option<ValidationResult> {
        let missing = proof.missing(&requirements.categories);
        if missing.is_empty() {
            return None;
        }
        Some(
            ValidationResult::rejected(
                ErrorKind::MissingEvidence,
                format!("missing evidence for: {}", missing.join(", ")),
            )
            .for_task(&requirements.task_id, None)
            .with_tier(requirements.tier)
            .with_missing(missing),
        )
    }

    /// Re-verify each category the verifier handles; the first failure rejects
    #[must_use]
    pub fn verify(
        &self,
        requirements: &CompletionRequirements,
        proof: &ProofPackage,
        verifier: &dyn Verifier,
    ) -> Option<ValidationResult> {
        for category in &requirements.categories {
            if !verifier.handles(category) {
                continue;
            }
            let evidence = proof.get(category).unwrap_or_default();
            let failure = match verifier.verify(category, evidence) {
                Ok(outcome) if outcome.passed => {
                    log::debug!("{}: {category} verified", requirements.task_id);
                    continue;
                }
                Ok(outcome) if outcome.timed_out => {
                    format!("verification of {category} timed out: {}", quote(&outcome.output))
                }
                Ok(outcome) => format!("verification of {category} failed: {}", quote(&outcome.output)),
                Err(e) => format!("verification of {category} could not run: {e:#}"),
            };
            log::info!("{}: {failure}", requirements.task_id);
            return Some(
                ValidationResult::rejected(ErrorKind::VerificationFailed, failure)
                    .for_task(&requirements.task_id, None)
                    .with_tier(requirements.tier)
                    .with_missing(vec![category.clone()]),
            );
        }
        None
    }

    /// Final routing once evidence is present and verified
    ///
    /// Blocked when dependencies are incomplete; approved when the task may
    /// complete immediately; pending when a human must decide.
    #[must_use]
    pub fn route(
        &self,
        state: &SessionState,
        requirements: &CompletionRequirements,
        proof: &ProofPackage,
    ) -> ValidationResult {
        let task_id = requirements.task_id.as_str();
        let tier = requirements.tier;
        let unmet = state
            .tasks
            .get(task_id)
            .map(|task| state.unmet_dependencies(task))
            .unwrap_or_default();
        if !unmet.is_empty() {
            return ValidationResult::blocked(format!(
                "dependencies not complete: {}",
                unmet.join(", ")
            ))
            .for_task(task_id, None)
            .with_tier(tier)
            .with_missing(unmet);
        }

        let ambiguous = proof.ambiguous(&requirements.categories, &self.proof.ambiguous_markers);
        let review_reason = if !ambiguous.is_empty() {
            Some(format!("ambiguous evidence in: {}", ambiguous.join(", ")))
        } else if tier > RiskTier::Low {
            Some(format!("{tier}-risk task requires human approval"))
        } else {
            None
        };

        let result = match (review_reason, self.level) {
            (Some(reason), EnforcementLevel::Permissive) => {
                ValidationResult::approved(format!("{reason} (auto-approved: permissive)"))
            }
            (Some(reason), _) => ValidationResult::pending(reason),
            (None, _) => ValidationResult::approved("all required evidence present and verified"),
        };
        let result = result.for_task(task_id, None).with_tier(tier);
        if ambiguous.is_empty() { result } else { result.with_missing(ambiguous) }
    }
}

fn quote(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return "no output".to_string();
    }
    if trimmed.chars().count() <= MAX_QUOTED_OUTPUT {
        return trimmed.to_string();
    }
    let tail: String = trimmed.chars().rev().take(MAX_QUOTED_OUTPUT).collect();
    format!("...{}", tail.chars().rev().collect::<String>())
}

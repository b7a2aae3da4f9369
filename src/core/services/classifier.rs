//! Risk classification
//!
//! Maps free text to a [`RiskTier`] using configured patterns. The mapping is
//! total: text no pattern matches gets the configured default tier.

use regex::Regex;

use crate::config::{RiskConfig, compile_pattern};
use crate::core::models::{RiskTier, SessionState, Task};
use crate::error::EnforcerError;

/// Compiled risk patterns
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    high: Vec<Regex>,
    low: Vec<Regex>,
    medium: Vec<Regex>,
    default_tier: RiskTier,
}

impl RiskClassifier {
    /// Compile the patterns of a `[risk]` section
    pub fn new(config: &RiskConfig) -> Result<Self, EnforcerError> {
        let compile = |patterns: &[String]| -> Result<Vec<Regex>, EnforcerError> {
            patterns.iter().map(|p| compile_pattern(p)).collect()
        };
        Ok(Self {
            high: compile(&config.human_review_patterns)?,
            low: compile(&config.auto_approve_patterns)?,
            medium: compile(&config.medium_patterns)?,
            default_tier: config.default_tier,
        })
    }

    /// Classify text: human-review patterns first, then auto-approve, then medium
    #[must_use]
    pub fn classify(&self, text: &str) -> RiskTier {
        let hit = |patterns: &[Regex]| patterns.iter().any(|re| re.is_match(text));
        if hit(&self.high) {
            RiskTier::High
        } else if hit(&self.low) {
            RiskTier::Low
        } else if hit(&self.medium) {
            RiskTier::Medium
        } else {
            self.default_tier
        }
    }

    /// The task's recorded tier, or its id and description classified now
    #[must_use]
    pub fn task_tier(&self, task: &Task) -> RiskTier {
        task.risk_tier.unwrap_or_else(|| self.classify(&task.subject()))
    }

    /// Give every task without a recorded tier one
    pub fn classify_tasks(&self, state: &mut SessionState) {
        for task in state.tasks.values_mut().filter(|t| t.risk_tier.is_none()) {
            let tier = self.classify(&task.subject());
            log::debug!("{} classified as {tier} risk", task.id);
            task.risk_tier = Some(tier);
        }
    }

    /// Tier for an action taken under `task`
    ///
    /// A HIGH-tier task lifts every action to at least MEDIUM.
    #[must_use]
    pub fn classify_action(&self, action: &str, task: &Task) -> RiskTier {
        let tier = self.classify(action);
        if self.task_tier(task) == RiskTier::High {
            tier.max(RiskTier::Medium)
        } else {
            tier
        }
    }
}

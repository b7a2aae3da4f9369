//! Custom action rules
//!
//! Rules are polymorphic objects registered at startup and evaluated in
//! registration order. The first rule that does not approve decides.

use std::fmt::Debug;

use regex::Regex;

use crate::config::{RuleConfig, RuleVerdict, compile_pattern};
use crate::core::models::{ActionRequest, RiskTier, Task};
use crate::error::EnforcerError;

/// What a rule decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No objection
    Approve,
    /// Refuse the action with a reason
    Reject(String),
    /// Block the action with a reason
    Block(String),
    /// Send the action to human review with a reason
    Escalate(String),
}

impl Verdict {
    /// Whether the verdict lets evaluation continue
    #[must_use]
    pub const fn is_approve(&self) -> bool {
        matches!(self, Self::Approve)
    }
}

/// What a rule can see besides the request itself
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Identity proposing the action
    pub caller: &'a str,
    /// Task the action is for
    pub task: &'a Task,
    /// Tier the action was classified as
    pub tier: RiskTier,
}

/// A custom validation rule
pub trait ValidationRule: Debug + Send + Sync {
    /// Name reported in results and audit events
    fn name(&self) -> &str;

    /// Decide on one proposed action
    fn evaluate(&self, action: &ActionRequest, context: &RuleContext<'_>) -> Verdict;
}

/// Rule backed by a `[[rules]]` config entry
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
    verdict: RuleVerdict,
    message: String,
}

impl PatternRule {
    /// Compile a configured rule
    pub fn from_config(config: &RuleConfig) -> Result<Self, EnforcerError> {
        Ok(Self {
            name: config.name.clone(),
            pattern: compile_pattern(&config.pattern)?,
            verdict: config.verdict,
            message: config.message.clone(),
        })
    }
}

impl ValidationRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, action: &ActionRequest, _context: &RuleContext<'_>) -> Verdict {
        if !self.pattern.is_match(&action.action) {
            return Verdict::Approve;
        }
        let message = if self.message.trim().is_empty() {
            format!("action matches rule '{}'", self.name)
        } else {
            self.message.clone()
        };
        match self.verdict {
            RuleVerdict::Reject => Verdict::Reject(message),
            RuleVerdict::Block => Verdict::Block(message),
            RuleVerdict::Escalate => Verdict::Escalate(message),
        }
    }
}

/// Ordered collection of rules
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleSet {
    /// Build from `[[rules]]` entries, preserving their order
    pub fn from_config(configs: &[RuleConfig]) -> Result<Self, EnforcerError> {
        let mut set = Self::default();
        for config in configs {
            set.register(Box::new(PatternRule::from_config(config)?));
        }
        Ok(set)
    }

    /// Append a rule; it runs after every rule already registered
    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        log::debug!("registered rule {}", rule.name());
        self.rules.push(rule);
    }

    /// Number of registered rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First non-approving verdict and the name of the rule that gave it
    #[must_use]
    pub fn evaluate(
        &self,
        action: &ActionRequest,
        context: &RuleContext<'_>,
    ) -> Option<(String, Verdict)> {
        self.rules.iter().find_map(|rule| {
            let verdict = rule.evaluate(action, context);
            (!verdict.is_approve()).then(|| (rule.name().to_string(), verdict))
        })
    }
}

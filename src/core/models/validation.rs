//! Validation results
//!
//! Both the action validator and the completion validator produce a
//! `ValidationResult`. Results are never changed once built: a new decision
//! produces a new result, so the audit trail keeps every one of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RiskTier;
use crate::error::{EnforcerError, ErrorKind};

/// Outcome of a validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Allowed to proceed
    Approved,
    /// Refused; the caller must change its input
    Rejected,
    /// Awaiting a human decision
    Pending,
    /// Not allowed in the current state (no task, gate closed, task inactive)
    Blocked,
}

impl ValidationStatus {
    /// Process exit code used by the CLI for this outcome
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Approved => 0,
            Self::Rejected => 2,
            Self::Pending => 3,
            Self::Blocked => 4,
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Pending => write!(f, "pending"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// An immutable allow/deny decision with its reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    status: ValidationStatus,
    reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    justification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tier: Option<RiskTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_rule: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reviewer: Option<String>,
    timestamp: String,
}

impl ValidationResult {
    /// Create a result; an empty reason is replaced by the status name
    #[must_use]
    pub fn new(status: ValidationStatus, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            format!("{status} without further detail")
        } else {
            reason
        };
        Self {
            status,
            reason,
            task_id: None,
            justification: None,
            tier: None,
            matched_rule: None,
            missing: Vec::new(),
            kind: None,
            evidence: None,
            reviewer: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Approved result
    #[must_use]
    pub fn approved(reason: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Approved, reason)
    }

    /// Rejected result with the error kind that caused it
    #[must_use]
    pub fn rejected(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Rejected, reason).with_kind(kind)
    }

    /// Pending result awaiting human review
    #[must_use]
    pub fn pending(reason: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Pending, reason)
    }

    /// Blocked result
    #[must_use]
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::new(ValidationStatus::Blocked, reason).with_kind(ErrorKind::BlockedAction)
    }

    /// Attach the task and the justification that produced this result
    #[must_use]
    pub fn for_task(mut self, task_id: impl Into<String>, justification: Option<&str>) -> Self {
        self.task_id = Some(task_id.into());
        self.justification = justification.map(String::from);
        self
    }

    /// Attach the evaluated risk tier
    #[must_use]
    pub fn with_tier(mut self, tier: RiskTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Attach the rule that decided the outcome
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.matched_rule = Some(rule.into());
        self
    }

    /// Attach the items the caller must supply
    #[must_use]
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = missing;
        self
    }

    /// Attach the error kind
    #[must_use]
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Attach structured evidence
    #[must_use]
    pub fn with_evidence(mut self, evidence: Value) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// Attach the reviewer identity
    #[must_use]
    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }

    /// Outcome
    #[must_use]
    pub const fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Human-readable reason (never empty)
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Task the decision concerns
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Justification or decision note that produced the decision
    #[must_use]
    pub fn justification(&self) -> Option<&str> {
        self.justification.as_deref()
    }

    /// Risk tier evaluated
    #[must_use]
    pub const fn tier(&self) -> Option<RiskTier> {
        self.tier
    }

    /// Rule that decided the outcome, if any
    #[must_use]
    pub fn matched_rule(&self) -> Option<&str> {
        self.matched_rule.as_deref()
    }

    /// Items the caller must supply before retrying
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// Error kind behind a non-approving outcome
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    /// Structured evidence
    #[must_use]
    pub const fn evidence(&self) -> Option<&Value> {
        self.evidence.as_ref()
    }

    /// Reviewer identity for human decisions
    #[must_use]
    pub fn reviewer(&self) -> Option<&str> {
        self.reviewer.as_deref()
    }

    /// When the decision was made (RFC3339)
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Whether the outcome is approved
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == ValidationStatus::Approved
    }

    /// Convert a non-approved outcome into the matching error
    ///
    /// Guard-style callers use this to stop before performing an action.
    pub fn ensure_approved(self) -> Result<Self, EnforcerError> {
        match self.status {
            ValidationStatus::Approved => Ok(self),
            ValidationStatus::Pending => Err(EnforcerError::BlockedAction {
                reason: format!("awaiting human review: {}", self.reason),
                missing: self.missing,
            }),
            ValidationStatus::Blocked => Err(EnforcerError::BlockedAction {
                reason: self.reason,
                missing: self.missing,
            }),
            ValidationStatus::Rejected => Err(self.into_rejection()),
        }
    }

    fn into_rejection(self) -> EnforcerError {
        let task_id = self.task_id.unwrap_or_default();
        match self.kind {
            Some(ErrorKind::MissingEvidence) => EnforcerError::MissingEvidence {
                task_id,
                missing: self.missing,
            },
            Some(ErrorKind::VerificationFailed) => EnforcerError::VerificationFailed {
                category: self.missing.first().cloned().unwrap_or_default(),
                reason: self.reason,
            },
            Some(ErrorKind::BlockedAction) => EnforcerError::BlockedAction {
                reason: self.reason,
                missing: self.missing,
            },
            None if self.matched_rule.is_some() => EnforcerError::BlockedAction {
                reason: format!(
                    "rejected by rule '{}': {}",
                    self.matched_rule.unwrap_or_default(),
                    self.reason
                ),
                missing: self.missing,
            },
            _ => EnforcerError::InsufficientJustification {
                reason: self.reason,
            },
        }
    }
}

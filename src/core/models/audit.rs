//! Audit events
//!
//! Every validation decision and every status transition produces one event.
//! Events are append-only; sequence numbers are assigned by the sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Transition, ValidationResult, ValidationStatus};

/// What kind of decision an audit event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Validation approved
    Approved,
    /// Validation rejected
    Rejected,
    /// Validation deferred to a human
    Pending,
    /// Validation blocked
    Blocked,
    /// Forward status change
    Transitioned,
    /// Backward status change (rework)
    Regressed,
    /// Operation failed with an error
    Failed,
}

impl From<ValidationStatus> for Decision {
    fn from(status: ValidationStatus) -> Self {
        match status {
            ValidationStatus::Approved => Self::Approved,
            ValidationStatus::Rejected => Self::Rejected,
            ValidationStatus::Pending => Self::Pending,
            ValidationStatus::Blocked => Self::Blocked,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Pending => write!(f, "pending"),
            Self::Blocked => write!(f, "blocked"),
            Self::Transitioned => write!(f, "transitioned"),
            Self::Regressed => write!(f, "regressed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "pending" => Ok(Self::Pending),
            "blocked" => Ok(Self::Blocked),
            "transitioned" => Ok(Self::Transitioned),
            "regressed" => Ok(Self::Regressed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!(
                "Invalid decision: {s}. Use: approved, rejected, pending, blocked, \
                 transitioned, regressed, failed"
            )),
        }
    }
}

/// One append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the log, assigned on append
    #[serde(default)]
    pub seq: u64,

    /// When the event happened (RFC3339)
    pub timestamp: String,

    /// Identity that caused the event
    pub actor: String,

    /// Operation name (select, validate_action, approve, ...)
    pub action: String,

    /// Outcome
    pub decision: Decision,

    /// Human-readable reason
    pub reason: String,

    /// Task involved, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Structured extras (tier, rule, transition, excerpt)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AuditEvent {
    /// Create an unsequenced event stamped now
    #[must_use]
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        decision: Decision,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            seq: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            actor: actor.into(),
            action: action.into(),
            decision,
            reason: reason.into(),
            task_id: None,
            details: None,
        }
    }

    /// Attach the task id
    #[must_use]
    pub fn for_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Event for a validation result
    #[must_use]
    pub fn from_result(actor: &str, action: &str, result: &ValidationResult) -> Self {
        let mut details = serde_json::Map::new();
        if let Some(tier) = result.tier() {
            details.insert("tier".to_string(), Value::String(tier.to_string()));
        }
        if let Some(rule) = result.matched_rule() {
            details.insert("rule".to_string(), Value::String(rule.to_string()));
        }
        if let Some(kind) = result.kind() {
            details.insert("kind".to_string(), Value::String(kind.to_string()));
        }
        if let Some(justification) = result.justification() {
            details.insert("justification".to_string(), Value::String(excerpt(justification)));
        }
        if let Some(reviewer) = result.reviewer() {
            details.insert("reviewer".to_string(), Value::String(reviewer.to_string()));
        }
        if !result.missing().is_empty() {
            details.insert("missing".to_string(), serde_json::json!(result.missing()));
        }

        let mut event = Self::new(actor, action, result.status().into(), result.reason());
        if let Some(task_id) = result.task_id() {
            event = event.for_task(task_id);
        }
        if details.is_empty() {
            event
        } else {
            event.with_details(Value::Object(details))
        }
    }

    /// Event for an applied status change
    #[must_use]
    pub fn from_transition(actor: &str, action: &str, transition: &Transition) -> Self {
        let decision = if transition.is_regression() {
            Decision::Regressed
        } else {
            Decision::Transitioned
        };
        Self::new(
            actor,
            action,
            decision,
            format!("{} -> {}", transition.from, transition.to),
        )
        .for_task(transition.task_id.clone())
        .with_details(serde_json::json!({
            "from": transition.from,
            "to": transition.to,
        }))
    }
}

/// Longest justification excerpt stored in the audit trail
pub const EXCERPT_CHARS: usize = 120;

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(EXCERPT_CHARS).collect();
        format!("{cut}...")
    }
}

//! Audit analytics
//!
//! Aggregates an audit trail into the numbers an operator looks at:
//! how often actions were approved, how many deviations were stopped,
//! and how much rework happened.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::models::{AuditEvent, Decision};

/// Operation name used for action validation events
pub const VALIDATE_ACTION: &str = "validate_action";

/// Per-actor counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActorSummary {
    /// Events caused by this actor
    pub events: usize,
    /// Action validations requested
    pub actions: usize,
    /// Action validations approved
    pub approved_actions: usize,
    /// Tasks completed
    pub completions: usize,
}

/// Aggregated view of an audit trail
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    /// Total number of events
    pub total_events: usize,
    /// Events per decision
    pub by_decision: BTreeMap<Decision, usize>,
    /// Action validations requested
    pub actions_validated: usize,
    /// Share of action validations approved (0.0 when none)
    pub action_approval_rate: f64,
    /// Actions rejected or blocked
    pub deviations_prevented: usize,
    /// Actions sent to human review
    pub escalations: usize,
    /// Backward status changes
    pub rework: usize,
    /// Tasks that reached completion
    pub tasks_completed: usize,
    /// Per-actor breakdown
    pub by_actor: BTreeMap<String, ActorSummary>,
}

impl AuditSummary {
    /// Summarize a slice of events
    #[must_use]
    pub fn from_events(events: &[AuditEvent]) -> Self {
        let mut summary = Self {
            total_events: events.len(),
            ..Self::default()
        };
        let mut approved_actions = 0usize;

        for event in events {
            *summary.by_decision.entry(event.decision).or_default() += 1;
            let actor = summary.by_actor.entry(event.actor.clone()).or_default();
            actor.events += 1;

            let completed = event.decision == Decision::Transitioned
                && event
                    .details
                    .as_ref()
                    .and_then(|d| d.get("to"))
                    .and_then(|to| to.as_str())
                    == Some("complete");
            if completed {
                summary.tasks_completed += 1;
                actor.completions += 1;
            }

            if event.decision == Decision::Regressed {
                summary.rework += 1;
            }

            if event.action != VALIDATE_ACTION {
                continue;
            }
            summary.actions_validated += 1;
            actor.actions += 1;
            match event.decision {
                Decision::Approved => {
                    approved_actions += 1;
                    actor.approved_actions += 1;
                }
                Decision::Rejected | Decision::Blocked => summary.deviations_prevented += 1,
                Decision::Pending => summary.escalations += 1,
                Decision::Transitioned | Decision::Regressed | Decision::Failed => {}
            }
        }

        if summary.actions_validated > 0 {
            #[allow(clippy::cast_precision_loss)]
            let rate = approved_actions as f64 / summary.actions_validated as f64;
            summary.action_approval_rate = rate;
        }
        summary
    }
}

//! End-to-end scenarios through the enforcer façade

use taskwarden::core::models::{Decision, TaskSpec, TaskStatus, ValidationStatus};
use taskwarden::{ActionRequest, Caller, EnforcerError, ErrorKind};

use super::common::fixtures::{enforcer, high_proof, low_proof, start};

// =============================================================================
// Selection
// =============================================================================

#[test]
fn test_second_assignee_cannot_take_held_task() {
    let e = enforcer();
    let alice = Caller::new("alice");
    e.declare_task(&alice, TaskSpec::new("T1", "Write the onboarding guide")).unwrap();

    let task = e.select(&alice, "T1").unwrap();
    assert_eq!(task.status, TaskStatus::Selected);
    assert_eq!(task.assignee.as_deref(), Some("alice"));

    let err = e.select(&Caller::new("bob"), "T1").unwrap_err();
    assert!(matches!(err, EnforcerError::AlreadyAssigned { ref holder, .. } if holder == "alice"));
    assert_eq!(e.task("T1").unwrap().assignee.as_deref(), Some("alice"));
}

#[test]
fn test_unknown_task_cannot_be_selected() {
    let e = enforcer();
    let err = e.select(&Caller::new("alice"), "T404").unwrap_err();
    assert!(matches!(err, EnforcerError::InvalidTask { .. }));
}

#[test]
fn test_incomplete_dependency_blocks_selection() {
    let e = enforcer();
    let alice = Caller::new("alice");
    e.declare_task(&alice, TaskSpec::new("T1", "Write the parser")).unwrap();
    e.declare_task(&alice, TaskSpec::new("T2", "Document the parser").depends_on(["T1"]))
        .unwrap();

    let err = e.select(&alice, "T2").unwrap_err();
    assert!(
        matches!(err, EnforcerError::DependencyUnmet { ref unmet, .. } if unmet == &["T1"])
    );
    let task = e.task("T2").unwrap();
    assert_eq!(task.status, TaskStatus::Blocked);
    assert!(task.assignee.is_none());
    assert!(e.get_active(&alice).unwrap().is_none());

    let events = e.audit_events_for("T2").unwrap();
    assert!(events.iter().any(|ev| ev.decision == Decision::Transitioned));
    assert!(events.iter().any(|ev| ev.decision == Decision::Failed));
}

#[test]
fn test_blocked_task_unblocks_once_dependency_completes() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Fix the readme typo");
    e.declare_task(&Caller::new("lead"), TaskSpec::new("T3", "Publish the docs").depends_on(["T1"]))
        .unwrap();

    let bob = Caller::new("bob");
    assert!(e.select(&bob, "T3").is_err());
    assert_eq!(e.task("T3").unwrap().status, TaskStatus::Blocked);

    let done = e.request_completion(&alice, "T1", &low_proof()).unwrap();
    assert!(done.is_approved(), "{}", done.reason());

    let task = e.select(&bob, "T3").unwrap();
    assert_eq!(task.status, TaskStatus::Selected);
    let hops: Vec<String> = e
        .audit_events_for("T3")
        .unwrap()
        .into_iter()
        .filter(|ev| ev.action == "select" && ev.decision == Decision::Transitioned)
        .map(|ev| ev.reason)
        .collect();
    assert_eq!(hops, vec!["pending -> blocked", "blocked -> pending", "pending -> selected"]);
}

// =============================================================================
// Action validation
// =============================================================================

#[test]
fn test_short_justification_is_rejected_with_lengths() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Add retry to the HTTP client");

    let result = e
        .validate_action(&alice, &ActionRequest::new("T1", "edit src/client.rs", "fix"))
        .unwrap();
    assert_eq!(result.status(), ValidationStatus::Rejected);
    assert_eq!(result.kind(), Some(ErrorKind::InsufficientJustification));
    assert!(result.reason().contains('3'), "{}", result.reason());
    assert!(result.reason().contains("20"), "{}", result.reason());
    assert!(result.tier().is_some());
}

#[test]
fn test_unrelated_justification_is_rejected() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Add retry to the HTTP client");

    let result = e
        .validate_action(
            &alice,
            &ActionRequest::new("T1", "edit styles.css", "make the landing page background purple"),
        )
        .unwrap();
    assert_eq!(result.status(), ValidationStatus::Rejected);
}

#[test]
fn test_action_on_other_task_is_blocked() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Add retry to the HTTP client");
    e.declare_task(&alice, TaskSpec::new("T2", "Add caching to the HTTP client")).unwrap();

    let result = e
        .validate_action(
            &alice,
            &ActionRequest::new("T2", "edit src/cache.rs", "add caching layer to the HTTP client"),
        )
        .unwrap();
    assert_eq!(result.status(), ValidationStatus::Blocked);
    assert!(result.reason().contains("T1"), "{}", result.reason());
}

#[test]
fn test_high_risk_action_waits_for_review() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Rotate the session signing key");

    let result = e
        .validate_action(
            &alice,
            &ActionRequest::new(
                "T1",
                "deploy new signing key to production",
                "rotate the session signing key as the task requires",
            ),
        )
        .unwrap();
    assert_eq!(result.status(), ValidationStatus::Pending);
    assert_eq!(result.tier(), Some(taskwarden::core::models::RiskTier::High));
}

// =============================================================================
// Completion
// =============================================================================

#[test]
fn test_missing_functional_test_is_listed() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Fix the readme typo");

    let proof = low_proof().with("functional_test", "");
    let result = e.request_completion(&alice, "T1", &proof).unwrap();
    assert_eq!(result.status(), ValidationStatus::Rejected);
    assert_eq!(result.kind(), Some(ErrorKind::MissingEvidence));
    assert_eq!(result.missing(), ["functional_test".to_string()]);
    assert!(result.reason().contains("functional_test"));
    assert_eq!(e.task("T1").unwrap().status, TaskStatus::InProgress);

    let err = result.ensure_approved().unwrap_err();
    assert!(matches!(err, EnforcerError::MissingEvidence { .. }));
}

#[test]
fn test_low_risk_completion_is_immediate() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Fix the readme typo");

    let result = e.request_completion(&alice, "T1", &low_proof()).unwrap();
    assert_eq!(result.status(), ValidationStatus::Approved);
    let state = e.state().unwrap();
    assert_eq!(state.tasks["T1"].status, TaskStatus::Complete);
    assert!(state.completed.contains("T1"));
    assert!(e.get_active(&alice).unwrap().is_none());
}

#[test]
fn test_high_risk_completion_rejected_by_reviewer() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Harden the auth token validation");
    assert_eq!(e.task("T1").unwrap().risk_tier, Some(taskwarden::core::models::RiskTier::High));

    let result = e.request_completion(&alice, "T1", &high_proof()).unwrap();
    assert_eq!(result.status(), ValidationStatus::Pending);
    assert_eq!(e.task("T1").unwrap().status, TaskStatus::CompletionRequested);

    let lead = Caller::new("lead");
    let decision = e.reject_pending(&lead, "T1", "insufficient security review").unwrap();
    assert_eq!(decision.status(), ValidationStatus::Rejected);

    let task = e.task("T1").unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.assignee.is_none());

    let events = e.audit_events_for("T1").unwrap();
    let rejection = events.iter().find(|ev| ev.action == "reject" && ev.decision == Decision::Rejected);
    let rejection = rejection.expect("rejection is audited");
    assert_eq!(rejection.reason, "insufficient security review");
    assert_eq!(rejection.actor, "lead");
    let regressions = events.iter().filter(|ev| ev.decision == Decision::Regressed).count();
    assert_eq!(regressions, 2);
}

#[test]
fn test_second_approval_is_already_resolved() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Harden the auth token validation");
    e.request_completion(&alice, "T1", &high_proof()).unwrap();

    let lead = Caller::new("lead");
    assert!(e.approve_pending(&lead, "T1", "reviewed").unwrap().is_approved());
    let err = e.approve_pending(&lead, "T1", "reviewed").unwrap_err();
    assert!(matches!(err, EnforcerError::AlreadyResolved { status: TaskStatus::Complete, .. }));
    assert_eq!(e.task("T1").unwrap().status, TaskStatus::Complete);
}

#[test]
fn test_audit_summary_counts_scenario() {
    let e = enforcer();
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", "Add retry to the HTTP client");
    e.validate_action(&alice, &ActionRequest::new("T1", "edit src/client.rs", "fix")).unwrap();
    e.validate_action(
        &alice,
        &ActionRequest::new("T1", "edit src/client.rs", "add retry loop to the HTTP client"),
    )
    .unwrap();
    e.request_completion(&alice, "T1", &low_proof()).unwrap();

    let summary = e.audit_summary().unwrap();
    assert_eq!(summary.actions_validated, 2);
    assert_eq!(summary.deviations_prevented, 1);
    assert_eq!(summary.tasks_completed, 1);
    assert_eq!(summary.by_actor["alice"].completions, 1);
}

//! Tests for custom action rules registered on the enforcer

use std::sync::atomic::Ordering;

use taskwarden::config::{Config, EnforcementLevel, RuleConfig, RuleVerdict};
use taskwarden::core::models::{Decision, TaskSpec};
use taskwarden::core::services::Verdict;
use taskwarden::{ActionRequest, Caller, ValidationStatus};

use super::common::fixtures::{enforcer, enforcer_with, start};
use super::common::mocks::FixedRule;

const TASK: &str = "Clean stale build outputs from the cache";
const JUSTIFICATION: &str = "remove stale build outputs from the cache directory";

fn rule(name: &str, pattern: &str, verdict: RuleVerdict, message: &str) -> RuleConfig {
    RuleConfig {
        name: name.to_string(),
        pattern: pattern.to_string(),
        verdict,
        message: message.to_string(),
    }
}

#[test]
fn test_rules_run_in_registration_order_and_short_circuit() {
    let mut e = enforcer();
    let (approve, approve_calls) = FixedRule::new("always-fine", Verdict::Approve);
    let (reject, reject_calls) = FixedRule::new("no-cache", Verdict::Reject("cache is frozen".into()));
    let (never, never_calls) = FixedRule::new("unreached", Verdict::Block("unreachable".into()));
    e.register_rule(Box::new(approve));
    e.register_rule(Box::new(reject));
    e.register_rule(Box::new(never));

    let alice = Caller::new("alice");
    start(&e, &alice, "T1", TASK);
    let request = ActionRequest::new("T1", "rm -r target/cache", JUSTIFICATION);
    let result = e.validate_action(&alice, &request).unwrap();

    assert_eq!(result.status(), ValidationStatus::Rejected);
    assert_eq!(result.kind(), None);
    assert_eq!(result.matched_rule(), Some("no-cache"));
    assert_eq!(result.reason(), "cache is frozen");
    assert_eq!(approve_calls.load(Ordering::SeqCst), 1);
    assert_eq!(reject_calls.load(Ordering::SeqCst), 1);
    assert_eq!(never_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_rules_are_skipped_for_gated_actions() {
    let mut e = enforcer();
    let (rule, calls) = FixedRule::new("counting", Verdict::Approve);
    e.register_rule(Box::new(rule));
    let alice = Caller::new("alice");

    // No task selected: refused before any rule runs
    e.declare_task(&alice, TaskSpec::new("T1", TASK)).unwrap();
    let request = ActionRequest::new("T1", "rm -r target/cache", JUSTIFICATION);
    let result = e.validate_action(&alice, &request).unwrap();
    assert_eq!(result.status(), ValidationStatus::Blocked);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_configured_rules_precede_registered_ones() {
    let mut config = Config::default();
    config.rules.push(rule("no-force-push", r"push\s+--force", RuleVerdict::Block, ""));
    let mut e = enforcer_with(config);
    let (registered, calls) = FixedRule::new("registered", Verdict::Reject("nope".into()));
    e.register_rule(Box::new(registered));

    let alice = Caller::new("alice");
    start(&e, &alice, "T1", TASK);
    let request = ActionRequest::new("T1", "git push --force origin main", JUSTIFICATION);
    let result = e.validate_action(&alice, &request).unwrap();

    assert_eq!(result.status(), ValidationStatus::Blocked);
    assert_eq!(result.matched_rule(), Some("no-force-push"));
    assert_eq!(result.reason(), "action matches rule 'no-force-push'");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_escalating_rule_follows_enforcement_level() {
    for (level, expected) in [
        (EnforcementLevel::Moderate, ValidationStatus::Pending),
        (EnforcementLevel::Permissive, ValidationStatus::Approved),
    ] {
        let mut config = Config::default();
        config.enforcement.level = level;
        config.rules.push(rule(
            "review-deletes",
            r"\brm\b",
            RuleVerdict::Escalate,
            "deleting files needs a second pair of eyes",
        ));
        let e = enforcer_with(config);
        let alice = Caller::new("alice");
        start(&e, &alice, "T1", TASK);

        let request = ActionRequest::new("T1", "rm -r target/cache", JUSTIFICATION);
        let result = e.validate_action(&alice, &request).unwrap();
        assert_eq!(result.status(), expected, "{level}");
        assert_eq!(result.matched_rule(), Some("review-deletes"));
        assert!(result.reason().starts_with("deleting files needs a second pair of eyes"));
    }
}

#[test]
fn test_rule_decision_is_audited_with_rule_name() {
    let mut config = Config::default();
    config.rules.push(rule("no-sudo", r"^sudo\b", RuleVerdict::Reject, "no sudo"));
    let e = enforcer_with(config);
    let alice = Caller::new("alice");
    start(&e, &alice, "T1", TASK);

    let request = ActionRequest::new("T1", "sudo rm -r target/cache", JUSTIFICATION);
    e.validate_action(&alice, &request).unwrap();

    let event = e.audit_events_for("T1").unwrap().pop().unwrap();
    let details = event.details.unwrap();
    assert_eq!(details["rule"], "no-sudo");
    assert_eq!(event.decision, Decision::Rejected);
    assert!(details.get("kind").is_none());
}

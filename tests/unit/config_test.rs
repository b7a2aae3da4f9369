//! Tests for configuration flowing into the file-backed enforcer

use std::fs;

use taskwarden::config::{Config, EnforcementLevel};
use taskwarden::core::models::{RequirementSource, RiskTier, TaskSpec};
use taskwarden::{ActionRequest, Caller, Enforcer, EnforcerError, ValidationStatus};

use super::common::fixtures::{enforcer_with, filled_log};

const STRICT: &str = r#"
[enforcement]
level = "strict"
lock_timeout_ms = 500

[justification]
min_length = 10

[proof.defaults]
low = ["file_evidence"]
"#;

#[test]
fn test_open_reads_project_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".taskwarden.toml"), STRICT).unwrap();

    let e = Enforcer::open(dir.path()).unwrap();
    assert_eq!(e.config().enforcement.level, EnforcementLevel::Strict);
    assert_eq!(e.config().justification.min_length, 10);
    // Sections not mentioned keep their defaults
    assert_eq!(e.config().verification.timeout_secs, 60);
    assert_eq!(e.state_path(), dir.path().join("SESSION_STATE.json"));
}

#[test]
fn test_open_without_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let e = Enforcer::open(dir.path()).unwrap();
    assert_eq!(e.config(), &Config::default());
    assert!(e.tasks().unwrap().is_empty());
}

#[test]
fn test_open_with_invalid_pattern_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".taskwarden.toml"),
        "[[rules]]\nname = \"broken\"\npattern = \"(oops\"\nverdict = \"block\"\n",
    )
    .unwrap();
    let err = Enforcer::open(dir.path()).unwrap_err();
    assert!(matches!(err, EnforcerError::Config(ref msg) if msg.contains("(oops")));
    assert!(!err.is_recoverable());
}

#[test]
fn test_unnamed_rule_is_rejected() {
    let err = Config::parse("[[rules]]\nname = \" \"\npattern = \"rm\"\nverdict = \"block\"\n")
        .unwrap_err();
    assert!(matches!(err, EnforcerError::Config(_)));
}

#[test]
fn test_zero_verification_timeout_is_rejected() {
    let err = Config::parse("[verification]\ntimeout_secs = 0\n").unwrap_err();
    assert!(matches!(err, EnforcerError::Config(_)));
}

#[test]
fn test_configured_level_and_defaults_drive_decisions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".taskwarden.toml"), STRICT).unwrap();
    let e = Enforcer::open(dir.path()).unwrap();
    let alice = Caller::new("alice");

    e.declare_task(&alice, TaskSpec::new("T1", "Rename helpers in the parser")).unwrap();
    e.select(&alice, "T1").unwrap();
    e.submit_work_log(&alice, "T1", filled_log("T1")).unwrap();

    let requirements = e.completion_requirements("T1").unwrap();
    assert_eq!(requirements.tier, RiskTier::Low);
    assert_eq!(requirements.categories, vec!["file_evidence".to_string()]);
    assert_eq!(requirements.source, RequirementSource::TierDefault);

    // Strict sends medium-risk actions to review
    let request = ActionRequest::new("T1", "refactor the parser helpers", "rename parser helpers");
    let result = e.validate_action(&alice, &request).unwrap();
    assert_eq!(result.status(), ValidationStatus::Pending, "{}", result.reason());

    // The lowered minimum length admits a short justification
    let request = ActionRequest::new("T1", "edit src/parser.rs", "rename parser helpers");
    assert!(e.validate_action(&alice, &request).unwrap().is_approved());
}

#[test]
fn test_custom_risk_patterns_classify_tasks() {
    let mut config = Config::default();
    config.risk.human_review_patterns.push("billing".to_string());
    let e = enforcer_with(config);
    let task = e
        .declare_task(&Caller::new("alice"), TaskSpec::new("T1", "Tweak billing rounding"))
        .unwrap();
    assert_eq!(task.risk_tier, Some(RiskTier::High));
}

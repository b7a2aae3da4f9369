//! End-to-end agent and reviewer workflows

use std::fs;
use std::path::Path;

use predicates::prelude::*;
use tempfile::TempDir;

use super::{json_of, project, start, taskwarden};

const BILLING: &str = "Implement the billing API";

fn medium_evidence() -> Vec<&'static str> {
    vec![
        "-e",
        "file_evidence=src/billing.rs",
        "-e",
        "functional_test=cargo test billing: 14 passed",
        "-e",
        "error_check=no errors in build output",
        "-e",
        "integration_test=tests/billing_api.rs: 5 passed",
        "-e",
        "syntax_validation=cargo check clean",
    ]
}

fn request_billing_completion(dir: &Path) {
    taskwarden(dir)
        .args(["--as", "alice", "request-completion", "T1"])
        .args(medium_evidence())
        .assert()
        .code(3)
        .stdout(predicate::str::contains("PENDING medium-risk task requires human approval"));
}

#[test]
fn test_low_risk_task_completes_without_review() {
    let temp = project();
    let dir = temp.path();
    start(dir, "alice", "T1", "Fix typo in README");

    taskwarden(dir)
        .args(["--as", "alice", "request-completion", "T1", "-e", "file_evidence=README.md"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("missing evidence for: functional_test, error_check"));

    let proof = dir.join("proof.json");
    fs::write(
        &proof,
        r#"{"file_evidence": "README.md", "functional_test": "todo", "error_check": "clean"}"#,
    )
    .unwrap();
    taskwarden(dir)
        .args(["--as", "alice", "request-completion", "T1", "--proof"])
        .arg(&proof)
        .args(["-e", "functional_test=cargo test: 3 passed"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("APPROVED"));

    let output = taskwarden(dir).args(["--json", "task", "show", "T1"]).output().unwrap();
    assert_eq!(json_of(&output)["task"]["status"], "complete");
    taskwarden(dir)
        .args(["--as", "alice", "active"])
        .assert()
        .stdout(predicate::str::contains("alice has no active task"));
}

#[test]
fn test_medium_task_waits_for_reviewer() {
    let temp = project();
    let dir = temp.path();
    start(dir, "alice", "T1", BILLING);

    taskwarden(dir)
        .args(["requirements", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("T1 (medium risk"))
        .stdout(predicate::str::contains("  - integration_test"));

    request_billing_completion(dir);

    let output = taskwarden(dir).args(["--json", "status"]).output().unwrap();
    let json = json_of(&output);
    assert_eq!(json["awaiting_review"][0], "T1");
    assert_eq!(json["counts"]["completion_requested"], 1);

    taskwarden(dir)
        .args(["--as", "lead", "resolve", "approve", "T1", "-r", "verified the API by hand"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED verified the API by hand"))
        .stdout(predicate::str::contains("reviewer: lead"));

    taskwarden(dir)
        .args(["--as", "lead", "resolve", "approve", "T1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already resolved"));

    let output = taskwarden(dir).args(["--json", "status"]).output().unwrap();
    assert_eq!(json_of(&output)["counts"]["complete"], 1);
}

#[test]
fn test_revision_and_rejection_loops() {
    let temp = project();
    let dir = temp.path();
    start(dir, "alice", "T1", BILLING);
    request_billing_completion(dir);

    taskwarden(dir)
        .args(["--as", "lead", "resolve", "revise", "T1", "-r", "add a refund test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REJECTED add a refund test"));
    let output = taskwarden(dir).args(["--json", "task", "show", "T1"]).output().unwrap();
    let json = json_of(&output);
    assert_eq!(json["task"]["status"], "in_progress");
    assert_eq!(json["task"]["assignee"], "alice");
    assert_eq!(json["work_log_open"], true);

    request_billing_completion(dir);
    taskwarden(dir)
        .args(["--as", "lead", "resolve", "reject", "T1", "-r", "wrong pricing model"])
        .assert()
        .success();
    let output = taskwarden(dir).args(["--json", "task", "show", "T1"]).output().unwrap();
    let json = json_of(&output);
    assert_eq!(json["task"]["status"], "pending");
    assert!(json["task"]["assignee"].is_null());
    assert_eq!(json["work_log_open"], false);

    // Someone else can now pick it up
    taskwarden(dir).args(["--as", "bob", "select", "T1"]).assert().success();
}

#[test]
fn test_requirements_can_be_overridden() {
    let temp = project();
    let dir = temp.path();
    taskwarden(dir)
        .args(["requirements", "DOC-*", "--set", "file_evidence,error_check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DOC-* now requires file_evidence, error_check"));
    taskwarden(dir).args(["task", "add", "DOC-1", "Update the user guide"]).assert().success();

    let output = taskwarden(dir).args(["--json", "requirements", "DOC-1"]).output().unwrap();
    let json = json_of(&output);
    assert_eq!(json["categories"].as_array().unwrap().len(), 2);
    assert_eq!(json["source"]["kind"], "pattern");
    assert_eq!(json["source"]["key"], "DOC-*");

    taskwarden(dir).args(["requirements", "DOC-*", "--clear"]).assert().success();
    let output = taskwarden(dir).args(["--json", "requirements", "DOC-1"]).output().unwrap();
    assert_eq!(json_of(&output)["source"]["kind"], "tier_default");

    taskwarden(dir)
        .args(["requirements", "DOC-[", "--set", "file_evidence"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid requirement pattern"));
}

#[test]
fn test_audit_trail_over_cli() {
    let temp = project();
    let dir = temp.path();
    start(dir, "alice", "T1", "Fix typo in README");
    taskwarden(dir)
        .args(["--as", "alice", "validate-action", "T1", "-a", "edit README.md", "-j", "fix"])
        .assert()
        .code(2);
    taskwarden(dir)
        .args(["--as", "alice", "validate-action", "T1", "-a", "edit README.md"])
        .args(["-j", "fix the typo in the README heading"])
        .assert()
        .code(0);

    let output = taskwarden(dir).args(["--json", "audit", "list", "-t", "T1"]).output().unwrap();
    let events = json_of(&output)["events"].as_array().unwrap().clone();
    let actions: Vec<&str> = events.iter().map(|e| e["action"].as_str().unwrap()).collect();
    assert_eq!(
        actions,
        vec![
            "declare_task",
            "select",
            "submit_work_log",
            "submit_work_log",
            "validate_action",
            "validate_action"
        ]
    );
    let seqs: Vec<u64> = events.iter().map(|e| e["seq"].as_u64().unwrap()).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));

    let output = taskwarden(dir).args(["--json", "audit", "list", "-n", "1"]).output().unwrap();
    let last = json_of(&output);
    assert_eq!(last["events"].as_array().unwrap().len(), 1);
    assert_eq!(last["events"][0]["decision"], "approved");

    let output = taskwarden(dir).args(["--json", "audit", "summary"]).output().unwrap();
    let summary = json_of(&output);
    assert_eq!(summary["actions_validated"], 2);
    assert_eq!(summary["deviations_prevented"], 1);

    taskwarden(dir)
        .args(["audit", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Action approval rate:  50.0%"));
}

#[test]
fn test_state_file_is_found_from_subdirectory() {
    let temp = project();
    let nested = temp.path().join("src/deep");
    fs::create_dir_all(&nested).unwrap();
    taskwarden(&nested).args(["task", "add", "T1", "Fix typo in README"]).assert().success();
    assert!(!nested.join("SESSION_STATE.json").exists());

    let output = taskwarden(temp.path()).args(["--json", "task", "list"]).output().unwrap();
    assert_eq!(json_of(&output)["tasks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_status_of_empty_project() {
    let temp = TempDir::new().unwrap();
    taskwarden(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks declared"));
}

//! Tests for the file-backed session store and audit log

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};
use taskwarden::adapters::{JsonSessionStore, JsonlAuditLog, lock};
use taskwarden::core::models::{AuditEvent, Decision, RiskTier, TaskSpec, TaskStatus};
use taskwarden::core::ports::{AuditSink, SessionStore};
use taskwarden::error::ErrorKind;
use taskwarden::paths;
use taskwarden::{Caller, Enforcer, EnforcerError, ValidationStatus};

use super::common::fixtures::{filled_log, high_proof, low_proof};

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_unknown_fields_survive_a_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = paths::state_file(dir.path());
    let seeded = json!({
        "current_session_id": "session-7",
        "last_updated": "2026-01-01T00:00:00Z",
        "project_name": "legacy",
        "active_tasks": [
            "OLD-1",
            {
                "id": "T1",
                "description": "Document the CLI flags",
                "status": "pending",
                "risk_tier": "low",
                "owner_note": "keep me"
            }
        ],
        "completed_tasks": ["OLD-1"],
        "team_assignments": {},
        "validation_requirements": { "T*": ["file_evidence"] },
        "dashboard": { "theme": "dark" }
    });
    fs::write(&state_path, serde_json::to_string_pretty(&seeded).unwrap()).unwrap();

    let e = Enforcer::open(dir.path()).unwrap();
    assert_eq!(e.task("OLD-1").unwrap().status, TaskStatus::Complete);
    e.select(&Caller::new("alice"), "T1").unwrap();

    let written = read_json(&state_path);
    assert_eq!(written["current_session_id"], "session-7");
    assert_eq!(written["dashboard"]["theme"], "dark");
    assert_eq!(written["validation_requirements"]["T*"][0], "file_evidence");
    assert_ne!(written["last_updated"], "2026-01-01T00:00:00Z");

    let tasks = written["active_tasks"].as_array().unwrap();
    let t1 = tasks.iter().find(|t| t["id"] == "T1").unwrap();
    assert_eq!(t1["status"], "selected");
    assert_eq!(t1["owner_note"], "keep me");
    assert_eq!(written["team_assignments"]["alice"][0], "T1");
}

#[test]
fn test_held_lock_times_out_writers_but_not_readers() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonSessionStore::new(dir.path(), 50);
    store.update(|_| Ok(())).unwrap();

    let guard = lock::acquire(&paths::state_lock(dir.path()), Duration::from_millis(50)).unwrap();
    let err = store.update(|_| Ok(())).unwrap_err();
    assert!(matches!(err, EnforcerError::LockTimeout { waited_ms, .. } if waited_ms >= 50));
    assert!(err.is_recoverable());
    assert!(store.load().is_ok());

    drop(guard);
    store.update(|_| Ok(())).unwrap();
}

#[test]
fn test_lock_timeout_surfaces_from_enforcer() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".taskwarden.toml"), "[enforcement]\nlock_timeout_ms = 30\n").unwrap();
    let e = Enforcer::open(dir.path()).unwrap();

    let _guard = lock::acquire(&paths::state_lock(dir.path()), Duration::from_millis(30)).unwrap();
    let err = e.declare_task(&Caller::new("alice"), TaskSpec::new("T1", "demo")).unwrap_err();
    assert!(matches!(err, EnforcerError::LockTimeout { .. }));
    assert!(e.tasks().unwrap().is_empty());
}

#[test]
fn test_bare_task_ids_are_classified_from_their_text() {
    let dir = tempfile::tempdir().unwrap();
    let seeded = json!({ "active_tasks": ["Deploy auth service to production database"] });
    fs::write(paths::state_file(dir.path()), seeded.to_string()).unwrap();
    let id = "Deploy auth service to production database";

    let e = Enforcer::open(dir.path()).unwrap();
    assert_eq!(e.task(id).unwrap().risk_tier, Some(RiskTier::High));

    let alice = Caller::new("alice");
    e.select(&alice, id).unwrap();
    e.submit_work_log(&alice, id, filled_log(id)).unwrap();

    let result = e.request_completion(&alice, id, &low_proof()).unwrap();
    assert_eq!(result.status(), ValidationStatus::Rejected);
    assert_eq!(result.kind(), Some(ErrorKind::MissingEvidence));

    let result = e.request_completion(&alice, id, &high_proof()).unwrap();
    assert_eq!(result.status(), ValidationStatus::Pending);
    assert_eq!(e.task(id).unwrap().status, TaskStatus::CompletionRequested);
}

#[test]
fn test_held_audit_lock_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".taskwarden.toml"), "[enforcement]\nlock_timeout_ms = 30\n").unwrap();
    let e = Enforcer::open(dir.path()).unwrap();
    let alice = Caller::new("alice");
    e.declare_task(&alice, TaskSpec::new("T1", "Write docs")).unwrap();
    let logged = e.audit_events().unwrap().len();

    let guard = lock::acquire(&paths::audit_lock(dir.path()), Duration::from_millis(30)).unwrap();
    let err = e.select(&alice, "T1").unwrap_err();
    assert!(matches!(err, EnforcerError::LockTimeout { .. }));
    drop(guard);

    let reopened = Enforcer::open(dir.path()).unwrap();
    let task = reopened.task("T1").unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.assignee, None);
    assert!(reopened.state().unwrap().assignments.is_empty());
    assert_eq!(reopened.audit_events().unwrap().len(), logged);
}

#[test]
fn test_audit_log_is_append_only_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let log = JsonlAuditLog::new(dir.path(), 200);
    log.append(AuditEvent::new("alice", "select", Decision::Transitioned, "pending -> selected").for_task("T1"))
        .unwrap();
    let second = log
        .append(AuditEvent::new("bob", "declare_task", Decision::Approved, "declared T2").for_task("T2"))
        .unwrap();
    assert_eq!(second.seq, 2);

    let content = fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["seq"], 1);
    assert_eq!(first["decision"], "transitioned");
    assert_eq!(log.events_for_task("T2").unwrap().len(), 1);

    // A fresh handle continues the sequence
    let reopened = JsonlAuditLog::new(dir.path(), 200);
    let third = reopened.append(AuditEvent::new("alice", "release", Decision::Regressed, "x")).unwrap();
    assert_eq!(third.seq, 3);
}

#[test]
fn test_concurrent_writers_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let workers = 8;

    thread::scope(|scope| {
        for i in 0..workers {
            scope.spawn(move || {
                let e = Enforcer::open(root).unwrap();
                let caller = Caller::new(format!("agent-{i}"));
                e.declare_task(&caller, TaskSpec::new(format!("T{i}"), "parallel work")).unwrap();
                e.select(&caller, &format!("T{i}")).unwrap();
            });
        }
    });

    let e = Enforcer::open(root).unwrap();
    let state = e.state().unwrap();
    assert_eq!(state.tasks.len(), workers);
    assert!(state.tasks.values().all(|t| t.status == TaskStatus::Selected));
    assert_eq!(state.assignments.len(), workers);

    let seqs: Vec<u64> = e.audit_events().unwrap().iter().map(|ev| ev.seq).collect();
    let expected: Vec<u64> = (1..=u64::try_from(workers * 2).unwrap()).collect();
    assert_eq!(seqs, expected);
}

//! Test data builders

use taskwarden::adapters::{MemoryAuditLog, MemorySessionStore};
use taskwarden::config::{Config, EnforcementLevel};
use taskwarden::core::models::{ProofPackage, TaskSpec, WorkLogRecord};
use taskwarden::{Caller, Enforcer};

/// Enforcer over in-memory adapters
pub type TestEnforcer = Enforcer<MemorySessionStore, MemoryAuditLog>;

pub fn enforcer() -> TestEnforcer {
    enforcer_with(Config::default())
}

pub fn enforcer_with(config: Config) -> TestEnforcer {
    Enforcer::new(MemorySessionStore::default(), MemoryAuditLog::new(), config).unwrap()
}

pub fn enforcer_at(level: EnforcementLevel) -> TestEnforcer {
    let mut config = Config::default();
    config.enforcement.level = level;
    enforcer_with(config)
}

pub fn filled_log(task_id: &str) -> WorkLogRecord {
    WorkLogRecord {
        attempted: "Implement the change described by the task".to_string(),
        expected: "Tests pass and behavior matches the description".to_string(),
        actual: "Tests pass".to_string(),
        files_touched: vec!["src/lib.rs".to_string()],
        validation_command: "cargo test".to_string(),
        ..WorkLogRecord::new(task_id)
    }
}

/// Declare, select and open the work-log gate for a task
pub fn start(enforcer: &TestEnforcer, caller: &Caller, id: &str, description: &str) {
    enforcer.declare_task(caller, TaskSpec::new(id, description)).unwrap();
    enforcer.select(caller, id).unwrap();
    enforcer.submit_work_log(caller, id, filled_log(id)).unwrap();
}

pub fn low_proof() -> ProofPackage {
    ProofPackage::new()
        .with("file_evidence", "src/lib.rs modified, 40 lines")
        .with("functional_test", "cargo test: 24 passed, 0 failed")
        .with("error_check", "no errors in build output")
}

pub fn medium_proof() -> ProofPackage {
    low_proof()
        .with("integration_test", "tests/api.rs: 6 passed")
        .with("syntax_validation", "cargo check finished cleanly")
}

pub fn high_proof() -> ProofPackage {
    medium_proof()
        .with("comprehensive_testing", "full suite plus load test passed")
        .with("security_check", "cargo audit: 0 vulnerabilities")
}

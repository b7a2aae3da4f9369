//! Enforcer façade
//!
//! Composes the session store, the audit sink, the action and completion
//! policies and the verifier into the operations agents call. Every
//! decision and every status change is appended to the audit trail.
//!
//! Each state change happens inside a single store transaction, and the
//! events describing it are appended from inside that transaction. If the
//! audit append fails, the change is not written.

mod action;
mod completion;
mod review;
mod work_log;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::adapters::{CommandVerifier, JsonSessionStore, JsonlAuditLog};
use crate::config::Config;
use crate::core::models::{
    AuditEvent, Decision, SessionState, Task, TaskSpec, TaskStatus, Transition,
};
use crate::core::ports::{AuditSink, NoopVerifier, SessionStore, Verifier};
use crate::core::services::{
    ActionPolicy, AuditSummary, CompletionPolicy, ValidationRule, lifecycle,
};
use crate::error::EnforcerError;
use crate::paths;

const DECLARE_TASK: &str = "declare_task";
const SELECT: &str = "select";
const RELEASE: &str = "release";
const SET_REQUIREMENTS: &str = "set_requirements";

/// Identity of whoever is calling an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller(String);

impl Caller {
    /// Wrap an identity string
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// The identity as recorded in assignments and audit events
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of the select transaction
enum Selection {
    Selected(Task),
    Unchanged(Task),
    Blocked(EnforcerError),
}

/// Task-discipline enforcer over a session store and an audit sink
#[derive(Debug)]
pub struct Enforcer<S: SessionStore, A: AuditSink> {
    store: S,
    audit: A,
    config: Config,
    actions: ActionPolicy,
    completion: CompletionPolicy,
    verifier: Box<dyn Verifier>,
    root: PathBuf,
}

impl Enforcer<JsonSessionStore, JsonlAuditLog> {
    /// Open the file-backed enforcer for a project root
    ///
    /// Reads `.taskwarden.toml` if present. Verification commands from the
    /// configuration are run by a [`CommandVerifier`] in the project root.
    pub fn open(root: &Path) -> Result<Self, EnforcerError> {
        let config = Config::load(&paths::config_file(root))?;
        let timeout = config.enforcement.lock_timeout_ms;
        let store = JsonSessionStore::new(root, timeout);
        let audit = JsonlAuditLog::new(root, timeout);
        let verifier = CommandVerifier::new(&config.verification, root);

        let enforcer = Self::new(store, audit, config)?.with_root(root);
        if verifier.is_empty() {
            Ok(enforcer)
        } else {
            Ok(enforcer.with_verifier(Box::new(verifier)))
        }
    }

    /// Where the session state lives
    #[must_use]
    pub fn state_path(&self) -> &Path {
        self.store.path()
    }

    /// Where the audit trail lives
    #[must_use]
    pub fn audit_path(&self) -> &Path {
        self.audit.path()
    }
}

impl<S: SessionStore, A: AuditSink> Enforcer<S, A> {
    /// Build an enforcer from its parts
    ///
    /// Fails with `Config` if a configured pattern does not compile.
    pub fn new(store: S, audit: A, config: Config) -> Result<Self, EnforcerError> {
        config.validate()?;
        let actions = ActionPolicy::new(&config)?;
        Ok(Self {
            completion: CompletionPolicy::new(&config, actions.classifier().clone()),
            actions,
            store,
            audit,
            config,
            verifier: Box::new(NoopVerifier),
            root: PathBuf::from("."),
        })
    }

    /// Replace the evidence verifier
    #[must_use]
    pub fn with_verifier(mut self, verifier: Box<dyn Verifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Set the project root used for suggested work-log paths
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Append a custom action rule; rules run in registration order
    pub fn register_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.actions.register_rule(rule);
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying session store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current session snapshot
    ///
    /// Tasks stored without a risk tier come back classified.
    pub fn state(&self) -> Result<SessionState, EnforcerError> {
        let mut state = self.store.load()?;
        self.actions.classifier().classify_tasks(&mut state);
        Ok(state)
    }

    /// One task by id
    pub fn task(&self, task_id: &str) -> Result<Task, EnforcerError> {
        self.state()?.task(task_id).cloned()
    }

    /// All tasks, ordered by id
    pub fn tasks(&self) -> Result<Vec<Task>, EnforcerError> {
        Ok(self.state()?.tasks.into_values().collect())
    }

    /// The task the caller currently has selected or in progress
    pub fn get_active(&self, caller: &Caller) -> Result<Option<Task>, EnforcerError> {
        Ok(self.state()?.active_for(caller.identity()).cloned())
    }

    /// Add a pending task
    ///
    /// The risk tier is classified from the id and description.
    pub fn declare_task(&self, caller: &Caller, spec: TaskSpec) -> Result<Task, EnforcerError> {
        let mut task = Task::from_spec(spec);
        let tier = self.actions.classifier().task_tier(&task);
        task.risk_tier = Some(tier);
        let declared = self.store.update(|state| {
            if state.tasks.contains_key(&task.id) {
                return Err(EnforcerError::InvalidTask {
                    task_id: task.id.clone(),
                    reason: "a task with this id already exists".to_string(),
                });
            }
            let unknown: Vec<&str> = task
                .depends_on
                .iter()
                .filter(|dep| !state.tasks.contains_key(*dep))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(EnforcerError::InvalidTask {
                    task_id: task.id.clone(),
                    reason: format!("unknown dependencies: {}", unknown.join(", ")),
                });
            }
            state.tasks.insert(task.id.clone(), task.clone());
            self.commit_events(vec![
                AuditEvent::new(
                    caller.identity(),
                    DECLARE_TASK,
                    Decision::Approved,
                    format!("declared {}", task.id),
                )
                .for_task(&task.id)
                .with_details(serde_json::json!({ "tier": tier })),
            ])?;
            Ok(task.clone())
        });
        let declared = self.or_audit_failure(caller, DECLARE_TASK, &task.id, declared)?;
        log::info!("declared {} ({tier} risk)", declared.id);
        Ok(declared)
    }

    /// Take a task
    ///
    /// A task with incomplete dependencies is moved to `Blocked` (and that
    /// change is kept) before the call fails with `DependencyUnmet`.
    pub fn select(&self, caller: &Caller, task_id: &str) -> Result<Task, EnforcerError> {
        let who = caller.identity();
        let outcome = self.store.update(|state| {
            let task = state.task(task_id)?;
            if let Some(holder) = &task.assignee
                && holder != who
            {
                return Err(EnforcerError::AlreadyAssigned {
                    task_id: task_id.to_string(),
                    holder: holder.clone(),
                });
            }
            if task.is_held_by(who) && task.status.is_active() {
                return Ok(Selection::Unchanged(task.clone()));
            }
            if let Some(active) = state.active_for(who) {
                return Err(EnforcerError::AlreadyAssigned {
                    task_id: active.id.clone(),
                    holder: who.to_string(),
                });
            }

            let status = task.status;
            let unmet = state.unmet_dependencies(task);
            if !unmet.is_empty() {
                let mut events = Vec::new();
                if status != TaskStatus::Blocked {
                    let hop = lifecycle::transition(state, task_id, TaskStatus::Blocked)?;
                    events.push(AuditEvent::from_transition(who, SELECT, &hop));
                }
                let err = EnforcerError::DependencyUnmet {
                    task_id: task_id.to_string(),
                    unmet,
                };
                events.push(failure_event(caller, SELECT, task_id, &err));
                self.commit_events(events)?;
                return Ok(Selection::Blocked(err));
            }

            let mut hops = Vec::new();
            if status == TaskStatus::Blocked {
                hops.push(lifecycle::transition(state, task_id, TaskStatus::Pending)?);
            }
            hops.push(lifecycle::transition(state, task_id, TaskStatus::Selected)?);
            state.assign(task_id, who)?;
            self.commit_events(transition_events(caller, SELECT, &hops))?;
            Ok(Selection::Selected(state.task(task_id)?.clone()))
        });

        match self.or_audit_failure(caller, SELECT, task_id, outcome)? {
            Selection::Unchanged(task) => Ok(task),
            Selection::Selected(task) => {
                log::info!("{who} selected {task_id}");
                Ok(task)
            }
            Selection::Blocked(err) => {
                log::info!("{who} could not select {task_id}: {err}");
                Err(err)
            }
        }
    }

    /// Give a selected or in-progress task back
    ///
    /// Clears the assignment and the submitted work log.
    pub fn release(&self, caller: &Caller, task_id: &str) -> Result<Task, EnforcerError> {
        let who = caller.identity();
        let released = self.store.update(|state| {
            let task = state.task(task_id)?;
            if !task.is_held_by(who) {
                return Err(EnforcerError::InvalidTask {
                    task_id: task_id.to_string(),
                    reason: format!("{who} does not hold this task"),
                });
            }
            let hop = lifecycle::transition(state, task_id, TaskStatus::Pending)?;
            state.unassign(task_id)?;
            state.work_logs.remove(task_id);
            self.commit_events(transition_events(caller, RELEASE, &[hop]))?;
            Ok(state.task(task_id)?.clone())
        });
        let task = self.or_audit_failure(caller, RELEASE, task_id, released)?;
        log::info!("{who} released {task_id}");
        Ok(task)
    }

    /// Set the evidence categories for a task id or glob pattern
    ///
    /// An empty list removes the entry.
    pub fn set_requirements(
        &self,
        caller: &Caller,
        key: &str,
        categories: Vec<String>,
    ) -> Result<(), EnforcerError> {
        if key.contains(['*', '?', '[']) {
            glob::Pattern::new(key)
                .map_err(|e| EnforcerError::Config(format!("invalid requirement pattern {key}: {e}")))?;
        }
        let reason = if categories.is_empty() {
            format!("cleared requirements for {key}")
        } else {
            format!("{key} requires {}", categories.join(", "))
        };
        self.store.update(|state| {
            if categories.is_empty() {
                state.validation_requirements.remove(key);
            } else {
                state.validation_requirements.insert(key.to_string(), categories.clone());
            }
            self.commit_events(vec![AuditEvent::new(
                caller.identity(),
                SET_REQUIREMENTS,
                Decision::Approved,
                reason,
            )])
        })?;
        log::info!("{caller} set requirements for {key}");
        Ok(())
    }

    /// Every audit event, oldest first
    pub fn audit_events(&self) -> Result<Vec<AuditEvent>, EnforcerError> {
        self.audit.events()
    }

    /// Audit events for one task
    pub fn audit_events_for(&self, task_id: &str) -> Result<Vec<AuditEvent>, EnforcerError> {
        self.audit.events_for_task(task_id)
    }

    /// Aggregate the audit trail
    pub fn audit_summary(&self) -> Result<AuditSummary, EnforcerError> {
        Ok(AuditSummary::from_events(&self.audit.events()?))
    }

    fn record(&self, event: AuditEvent) -> Result<AuditEvent, EnforcerError> {
        self.audit.append(event)
    }

    /// Append the events describing a state change
    ///
    /// Called inside a store transaction; an error here fails the
    /// transaction and the change is discarded.
    fn commit_events(&self, events: Vec<AuditEvent>) -> Result<(), EnforcerError> {
        self.audit.append_all(events).map(drop)
    }

    /// Log a refused operation; a failing audit write is only warned about
    fn record_failure(&self, caller: &Caller, action: &str, task_id: &str, err: &EnforcerError) {
        if !err.is_recoverable() {
            return;
        }
        if let Err(audit_err) = self.record(failure_event(caller, action, task_id, err)) {
            log::warn!("could not audit failed {action} on {task_id}: {audit_err}");
        }
    }

    fn or_audit_failure<T>(
        &self,
        caller: &Caller,
        action: &str,
        task_id: &str,
        result: Result<T, EnforcerError>,
    ) -> Result<T, EnforcerError> {
        result.inspect_err(|err| {
            log::debug!("{action} {task_id} refused: {err}");
            self.record_failure(caller, action, task_id, err);
        })
    }
}

fn transition_events(caller: &Caller, action: &str, hops: &[Transition]) -> Vec<AuditEvent> {
    hops.iter()
        .map(|hop| AuditEvent::from_transition(caller.identity(), action, hop))
        .collect()
}

fn failure_event(caller: &Caller, action: &str, task_id: &str, err: &EnforcerError) -> AuditEvent {
    let event = AuditEvent::new(caller.identity(), action, Decision::Failed, err.to_string())
        .for_task(task_id);
    let missing = err.missing_items();
    if missing.is_empty() {
        event.with_details(serde_json::json!({ "kind": err.kind() }))
    } else {
        event.with_details(serde_json::json!({ "kind": err.kind(), "missing": missing }))
    }
}

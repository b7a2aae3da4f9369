//! Work-log gate operations

use chrono::Utc;

use super::{Caller, Enforcer, transition_events};
use crate::adapters::markdown::render_template;
use crate::core::models::{
    AuditEvent, Decision, REQUIRED_WORK_LOG_FIELDS, Task, TaskStatus, Transition, WorkLogGate,
    WorkLogRecord, WorkLogTemplate,
};
use crate::core::ports::{AuditSink, SessionStore};
use crate::core::services::lifecycle;
use crate::error::EnforcerError;
use crate::paths;

const SUBMIT_WORK_LOG: &str = "submit_work_log";

impl<S: SessionStore, A: AuditSink> Enforcer<S, A> {
    /// Whether the caller may act on the task yet
    ///
    /// `Closed` carries everything needed to write the log: the fields still
    /// missing, a markdown template and a suggested file path.
    pub fn require_work_log(
        &self,
        caller: &Caller,
        task_id: &str,
    ) -> Result<WorkLogGate, EnforcerError> {
        let state = self.state()?;
        let task = state.task(task_id)?;
        if state.work_log_open(task_id) {
            return Ok(WorkLogGate::Open);
        }
        log::debug!("work log for {task_id} not yet submitted by {caller}");

        let required_fields = state.work_logs.get(task_id).map_or_else(
            || REQUIRED_WORK_LOG_FIELDS.map(String::from).to_vec(),
            WorkLogRecord::missing_fields,
        );
        let now = Utc::now();
        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        Ok(WorkLogGate::Closed(Box::new(WorkLogTemplate {
            task_id: task_id.to_string(),
            required_fields,
            suggested_path: paths::work_log_artifact(&self.root, task_id, &stamp),
            markdown: render_template(task, &now.to_rfc3339()),
        })))
    }

    /// Accept a work log and start the task
    ///
    /// Fails with `IncompleteWorkLog` naming every blank field. A record
    /// written for another task counts as missing its `task_id`. The first
    /// accepted log moves the task from `Selected` to `InProgress`; later
    /// submissions replace the stored record.
    pub fn submit_work_log(
        &self,
        caller: &Caller,
        task_id: &str,
        mut record: WorkLogRecord,
    ) -> Result<Task, EnforcerError> {
        let who = caller.identity();
        if record.task_id.trim().is_empty() {
            record.task_id = task_id.to_string();
        }
        let mut missing = record.missing_fields();
        if record.task_id.trim() != task_id {
            missing.insert(0, "task_id".to_string());
        }
        if !missing.is_empty() {
            let err = EnforcerError::IncompleteWorkLog {
                task_id: task_id.to_string(),
                missing,
            };
            self.record_failure(caller, SUBMIT_WORK_LOG, task_id, &err);
            return Err(err);
        }
        record.task_id = task_id.to_string();
        record.complete = true;
        record.submitted_at = Some(Utc::now().to_rfc3339());

        let submitted = self.store.update(|state| {
            let task = state.task(task_id)?;
            if !task.is_held_by(who) || !task.status.is_active() {
                return Err(EnforcerError::InvalidTask {
                    task_id: task_id.to_string(),
                    reason: format!("{who} has not selected this task"),
                });
            }
            let hops: Vec<Transition> = if task.status == TaskStatus::Selected {
                vec![lifecycle::transition(state, task_id, TaskStatus::InProgress)?]
            } else {
                Vec::new()
            };
            state.work_logs.insert(task_id.to_string(), record.clone());

            let mut events = vec![
                AuditEvent::new(
                    who,
                    SUBMIT_WORK_LOG,
                    Decision::Approved,
                    format!("work log accepted for {task_id}"),
                )
                .for_task(task_id)
                .with_details(serde_json::json!({ "files_touched": record.files_touched })),
            ];
            events.extend(transition_events(caller, SUBMIT_WORK_LOG, &hops));
            self.commit_events(events)?;
            Ok(state.task(task_id)?.clone())
        });
        let task = self.or_audit_failure(caller, SUBMIT_WORK_LOG, task_id, submitted)?;
        log::info!("{who} opened the work-log gate for {task_id}");
        Ok(task)
    }
}

//! Output formatting for human and JSON modes
//!
//! Every CLI command builds one of the result types below and renders it
//! either as human-readable text or as pretty-printed JSON.

use std::collections::BTreeMap;

use colored::Colorize;
use serde::Serialize;

use crate::core::models::{
    AuditEvent, CompletionRequirements, Decision, RiskTier, SessionState, Task, TaskStatus,
    ValidationResult, ValidationStatus, WorkLogGate,
};
use crate::core::services::AuditSummary;
use crate::error::{EnforcerError, ErrorKind};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn status_label(status: ValidationStatus) -> String {
    let label = status.to_string().to_uppercase();
    match status {
        ValidationStatus::Approved => label.green().bold().to_string(),
        ValidationStatus::Rejected => label.red().bold().to_string(),
        ValidationStatus::Pending => label.yellow().bold().to_string(),
        ValidationStatus::Blocked => label.magenta().bold().to_string(),
    }
}

fn tier_label(tier: Option<RiskTier>) -> String {
    tier.map_or_else(|| "-".to_string(), |t| t.to_string())
}

fn task_status_label(status: TaskStatus) -> String {
    let label = status.to_string();
    match status {
        TaskStatus::Complete => label.green().to_string(),
        TaskStatus::Selected | TaskStatus::InProgress => label.cyan().to_string(),
        TaskStatus::CompletionRequested => label.yellow().to_string(),
        TaskStatus::Blocked | TaskStatus::Rejected => label.red().to_string(),
        TaskStatus::Pending | TaskStatus::RevisionRequested => label,
    }
}

/// Generic operation result for simple commands
#[derive(Debug, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub message: String,
}

impl OperationResult {
    /// Successful operation with a message
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => println!("{}", self.message),
            OutputMode::Json => print_json(self),
        }
    }
}

/// A failed command, as reported to the caller
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
    /// Error kind, when the failure came from the enforcer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Items to supply before retrying
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    /// Whether correcting the input and retrying can succeed
    pub recoverable: bool,
}

impl ErrorReport {
    /// Build from any CLI error, unwrapping an enforcer error when present
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        let enforcer = err.downcast_ref::<EnforcerError>();
        Self {
            success: false,
            error: format!("{err:#}"),
            kind: enforcer.map(EnforcerError::kind),
            missing: enforcer.map(|e| e.missing_items().to_vec()).unwrap_or_default(),
            recoverable: enforcer.is_some_and(EnforcerError::is_recoverable),
        }
    }

    /// Render the report based on output mode (human text goes to stderr)
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                eprintln!("{} {}", "error:".red().bold(), self.error);
                if !self.missing.is_empty() {
                    eprintln!("  missing: {}", self.missing.join(", "));
                }
            }
            OutputMode::Json => print_json(self),
        }
    }
}

/// Outcome of a validation, approval or completion request
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Operation that produced the result
    pub operation: String,
    /// The decision
    #[serde(flatten)]
    pub result: ValidationResult,
}

impl ValidationReport {
    /// Wrap a result for display
    #[must_use]
    pub fn new(operation: impl Into<String>, result: ValidationResult) -> Self {
        Self {
            operation: operation.into(),
            result,
        }
    }

    /// Process exit code for the decision
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.result.status().exit_code()
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let result = &self.result;
        println!("{} {}", status_label(result.status()), result.reason());
        if let Some(task_id) = result.task_id() {
            println!("  task:     {task_id}");
        }
        if let Some(tier) = result.tier() {
            println!("  risk:     {tier}");
        }
        if let Some(rule) = result.matched_rule() {
            println!("  rule:     {rule}");
        }
        if let Some(reviewer) = result.reviewer() {
            println!("  reviewer: {reviewer}");
        }
        if !result.missing().is_empty() {
            println!("  missing:  {}", result.missing().join(", "));
        }
    }
}

/// A single task with its completion requirements
#[derive(Debug, Serialize)]
pub struct TaskReport {
    /// The task
    pub task: Task,
    /// Whether a complete work log has been submitted
    pub work_log_open: bool,
    /// What completion will require
    pub requirements: CompletionRequirements,
}

impl TaskReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let task = &self.task;
        println!("{} {}", task.id.bold(), task.description);
        println!("  status:     {}", task_status_label(task.status));
        println!("  risk:       {}", tier_label(task.risk_tier));
        println!("  priority:   {}", task.priority);
        println!("  assignee:   {}", task.assignee.as_deref().unwrap_or("-"));
        if !task.depends_on.is_empty() {
            let deps: Vec<&str> = task.depends_on.iter().map(String::as_str).collect();
            println!("  depends on: {}", deps.join(", "));
        }
        println!("  work log:   {}", if self.work_log_open { "submitted" } else { "required" });
        println!(
            "  evidence:   {} ({})",
            self.requirements.categories.join(", "),
            self.requirements.source
        );
    }
}

/// A list of tasks
#[derive(Debug, Serialize)]
pub struct TaskListResult {
    /// Tasks, ordered by id
    pub tasks: Vec<Task>,
}

impl TaskListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        if self.tasks.is_empty() {
            println!("No tasks.");
            return;
        }
        for task in &self.tasks {
            println!(
                "  {:<12} {:<22} {:<7} {:<10} {}",
                task.id,
                task_status_label(task.status),
                tier_label(task.risk_tier),
                task.assignee.as_deref().unwrap_or("-"),
                task.description
            );
        }
    }
}

/// The caller's active task, if any
#[derive(Debug, Serialize)]
pub struct ActiveResult {
    /// Identity asked about
    pub identity: String,
    /// Task selected or in progress
    pub task: Option<Task>,
}

impl ActiveResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => match &self.task {
                Some(task) => println!(
                    "{} is working on {} ({}): {}",
                    self.identity,
                    task.id.bold(),
                    task_status_label(task.status),
                    task.description
                ),
                None => println!("{} has no active task.", self.identity),
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// State of the work-log gate for a task
#[derive(Debug, Serialize)]
pub struct GateReport {
    /// Task asked about
    pub task_id: String,
    /// The gate
    #[serde(flatten)]
    pub gate: WorkLogGate,
}

impl GateReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => match &self.gate {
                WorkLogGate::Open => {
                    println!("{} work log submitted for {}", "OPEN".green().bold(), self.task_id);
                }
                WorkLogGate::Closed(template) => {
                    println!("{} work log required for {}", "CLOSED".red().bold(), self.task_id);
                    println!("  missing:   {}", template.required_fields.join(", "));
                    println!("  write to:  {}", template.suggested_path.display());
                    println!("  then run:  taskwarden work-log submit {}", self.task_id);
                }
            },
            OutputMode::Json => print_json(self),
        }
    }
}

/// Evidence requirements for a task
#[derive(Debug, Serialize)]
pub struct RequirementsReport {
    /// The requirements
    #[serde(flatten)]
    pub requirements: CompletionRequirements,
}

impl RequirementsReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                let reqs = &self.requirements;
                println!("{} ({} risk, from {})", reqs.task_id.bold(), reqs.tier, reqs.source);
                for category in &reqs.categories {
                    println!("  - {category}");
                }
                if !reqs.suggested_commands.is_empty() {
                    println!("\nSuggested validation commands:");
                    for command in &reqs.suggested_commands {
                        println!("  $ {command}");
                    }
                }
            }
            OutputMode::Json => print_json(self),
        }
    }
}

/// One row of the status overview
#[derive(Debug, Serialize)]
pub struct Assignment {
    /// Who holds the task
    pub assignee: String,
    /// Task id
    pub task_id: String,
    /// Task status
    pub status: TaskStatus,
}

/// Session overview
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Project name
    pub project_name: String,
    /// Session id
    pub session_id: String,
    /// Last write (RFC3339)
    pub last_updated: String,
    /// Number of tasks per status
    pub counts: BTreeMap<String, usize>,
    /// Tasks currently held
    pub assignments: Vec<Assignment>,
    /// Tasks waiting for a human decision
    pub awaiting_review: Vec<String>,
}

impl StatusReport {
    /// Summarize a session
    #[must_use]
    pub fn from_state(state: &SessionState) -> Self {
        let mut counts = BTreeMap::new();
        let mut assignments = Vec::new();
        let mut awaiting_review = Vec::new();
        for task in state.tasks.values() {
            *counts.entry(task.status.to_string()).or_insert(0) += 1;
            if let Some(assignee) = &task.assignee
                && !task.status.is_terminal()
            {
                assignments.push(Assignment {
                    assignee: assignee.clone(),
                    task_id: task.id.clone(),
                    status: task.status,
                });
            }
            if task.status == TaskStatus::CompletionRequested {
                awaiting_review.push(task.id.clone());
            }
        }
        Self {
            project_name: state.project_name.clone(),
            session_id: state.session_id.clone(),
            last_updated: state.last_updated.clone(),
            counts,
            assignments,
            awaiting_review,
        }
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        println!("{} ({})", self.project_name.bold(), self.session_id);
        println!("  last updated: {}", self.last_updated);
        if self.counts.is_empty() {
            println!("\nNo tasks declared. Run 'taskwarden task add <id> <description>'.");
            return;
        }
        println!();
        for (status, count) in &self.counts {
            println!("  {status:<22} {count}");
        }
        if !self.assignments.is_empty() {
            println!("\nHeld:");
            for a in &self.assignments {
                println!("  {:<12} {:<12} {}", a.assignee, a.task_id, task_status_label(a.status));
            }
        }
        if !self.awaiting_review.is_empty() {
            println!("\nAwaiting review: {}", self.awaiting_review.join(", "));
        }
    }
}

/// Audit events
#[derive(Debug, Serialize)]
pub struct AuditListResult {
    /// Events, oldest first
    pub events: Vec<AuditEvent>,
}

impl AuditListResult {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => {
                if self.events.is_empty() {
                    println!("No audit events.");
                }
                for event in &self.events {
                    let decision = match event.decision {
                        Decision::Approved | Decision::Transitioned => event.decision.to_string().green(),
                        Decision::Rejected | Decision::Blocked | Decision::Failed => {
                            event.decision.to_string().red()
                        }
                        Decision::Pending | Decision::Regressed => event.decision.to_string().yellow(),
                    };
                    println!(
                        "{:>5} {} {:<10} {:<18} {:<12} {:<6} {}",
                        event.seq,
                        event.timestamp,
                        event.actor,
                        event.action,
                        decision,
                        event.task_id.as_deref().unwrap_or("-"),
                        event.reason
                    );
                }
            }
            OutputMode::Json => print_json(self),
        }
    }
}

/// Aggregated audit numbers
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    /// The summary
    #[serde(flatten)]
    pub summary: AuditSummary,
}

impl SummaryReport {
    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => print_json(self),
        }
    }

    fn render_human(&self) {
        let s = &self.summary;
        println!("Audit events:          {}", s.total_events);
        println!("Actions validated:     {}", s.actions_validated);
        println!("Action approval rate:  {:.1}%", s.action_approval_rate * 100.0);
        println!("Deviations prevented:  {}", s.deviations_prevented);
        println!("Escalations:           {}", s.escalations);
        println!("Rework:                {}", s.rework);
        println!("Tasks completed:       {}", s.tasks_completed);
        if !s.by_actor.is_empty() {
            println!("\nBy actor:");
            for (actor, a) in &s.by_actor {
                println!(
                    "  {actor:<12} events {:<4} actions {:<4} approved {:<4} completed {}",
                    a.events, a.actions, a.approved_actions, a.completions
                );
            }
        }
    }
}

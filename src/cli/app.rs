//! CLI definitions and entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use super::commands;
use taskwarden::Caller;
use taskwarden::core::models::{Priority, TaskStatus};
use taskwarden::output::{ErrorReport, OutputMode};

/// taskwarden - Task discipline for AI coding agents
#[derive(Parser, Debug)]
#[command(
    name = "taskwarden",
    version,
    about = "Task discipline for AI coding agents",
    long_about = "Keep autonomous agents on one declared task at a time.\n\n\
                  Actions must be justified against the selected task, work is gated\n\
                  behind a work log, and completion needs evidence for every required\n\
                  category. Every decision is written to an append-only audit log.\n\n\
                  Exit codes: 0 approved, 2 rejected, 3 pending review, 4 blocked, 1 error."
)]
pub struct Cli {
    /// Identity of the caller (agent or reviewer)
    #[arg(
        long = "as",
        value_name = "IDENTITY",
        global = true,
        env = "TASKWARDEN_AGENT",
        default_value = "agent"
    )]
    pub identity: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize taskwarden in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Declare and inspect tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Select a task to work on
    Select {
        /// Task ID
        id: String,
    },

    /// Give a selected or in-progress task back
    Release {
        /// Task ID
        id: String,
    },

    /// Show the caller's active task
    Active,

    /// Work-log gate: template, submission and status
    WorkLog {
        #[command(subcommand)]
        action: WorkLogAction,
    },

    /// Validate a proposed action against the active task
    ValidateAction {
        /// Task the action advances
        task_id: String,

        /// What is about to be done
        #[arg(short, long)]
        action: String,

        /// How the action advances the task
        #[arg(short, long)]
        justification: String,

        /// Extra context as a JSON object
        #[arg(long)]
        context: Option<String>,
    },

    /// Show or set the evidence a task must provide
    Requirements {
        /// Task ID, or a glob pattern when setting
        key: String,

        /// Set the required categories (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "clear")]
        set: Vec<String>,

        /// Remove the entry for this key
        #[arg(long)]
        clear: bool,
    },

    /// Request completion of a task with proof
    RequestCompletion {
        /// Task ID
        id: String,

        /// JSON file mapping category to evidence
        #[arg(long)]
        proof: Option<PathBuf>,

        /// Evidence as category=evidence (repeatable)
        #[arg(short, long = "evidence", value_name = "CATEGORY=EVIDENCE")]
        evidence: Vec<String>,
    },

    /// Decide a pending completion request
    Resolve {
        #[command(subcommand)]
        action: ResolveAction,
    },

    /// Show a session overview
    Status,

    /// Inspect the audit log
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Declare a new task
    Add {
        /// Task ID
        id: String,

        /// What needs to be done
        description: String,

        /// Priority: p0 (critical), p1 (high), p2 (medium), p3 (low)
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Task IDs that must complete first
        #[arg(long = "depends-on", value_delimiter = ',')]
        depends_on: Vec<String>,
    },

    /// List tasks
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkLogAction {
    /// Print (or write) a markdown work-log template
    Template {
        /// Task ID
        id: String,

        /// Write the template to the suggested path under work_logs/
        #[arg(short, long)]
        write: bool,
    },

    /// Submit a filled-in work log
    Submit {
        /// Task ID
        id: String,

        /// Markdown file to submit (defaults to the newest artifact for the task)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show whether the gate is open
    Status {
        /// Task ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResolveAction {
    /// Approve the completion
    Approve {
        /// Task ID
        id: String,

        /// Decision note
        #[arg(short, long, default_value = "")]
        reason: String,
    },

    /// Send the task back for more work
    Revise {
        /// Task ID
        id: String,

        /// What needs to change
        #[arg(short, long)]
        reason: String,
    },

    /// Reject the completion and return the task to the pool
    Reject {
        /// Task ID
        id: String,

        /// Why it was rejected
        #[arg(short, long)]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuditAction {
    /// List events
    List {
        /// Only events for this task
        #[arg(short, long)]
        task: Option<String>,

        /// Show only the last N events
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Aggregate counts and rates
    Summary,
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let caller = Caller::new(cli.identity);

    match dispatch(cli.command, &caller, output_mode) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            log::debug!("command failed: {err:?}");
            ErrorReport::from_error(&err).render(output_mode);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Option<Command>, caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    match command {
        Some(Command::Init { force }) => commands::init(force, mode),
        Some(Command::Task { action }) => commands::task(action, caller, mode),
        Some(Command::Select { id }) => commands::select(&id, caller, mode),
        Some(Command::Release { id }) => commands::release(&id, caller, mode),
        Some(Command::Active) => commands::active(caller, mode),
        Some(Command::WorkLog { action }) => commands::work_log(action, caller, mode),
        Some(Command::ValidateAction {
            task_id,
            action,
            justification,
            context,
        }) => commands::validate_action(
            &task_id,
            &action,
            &justification,
            context.as_deref(),
            caller,
            mode,
        ),
        Some(Command::Requirements { key, set, clear }) => {
            commands::requirements(&key, set, clear, caller, mode)
        }
        Some(Command::RequestCompletion {
            id,
            proof,
            evidence,
        }) => commands::request_completion(&id, proof.as_deref(), &evidence, caller, mode),
        Some(Command::Resolve { action }) => commands::resolve(action, caller, mode),
        Some(Command::Status) => commands::status(mode),
        Some(Command::Audit { action }) => commands::audit(action, mode),
        Some(Command::Version) => {
            if mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": taskwarden::VERSION
                    })
                );
            } else {
                println!("taskwarden v{}", taskwarden::VERSION);
            }
            Ok(0)
        }
        None => {
            if mode == OutputMode::Json {
                println!(
                    "{}",
                    serde_json::json!({
                        "version": taskwarden::VERSION,
                        "hint": "Use --help for usage"
                    })
                );
            } else {
                println!("taskwarden v{}", taskwarden::VERSION);
                println!("\nRun 'taskwarden --help' for usage");
                println!("Run 'taskwarden init' to get started");
            }
            Ok(0)
        }
    }
}

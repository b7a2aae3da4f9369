//! Task declaration and lookup

use taskwarden::Caller;
use taskwarden::core::models::TaskSpec;
use taskwarden::output::{OutputMode, TaskListResult, TaskReport};

use super::FileEnforcer;
use crate::cli::app::TaskAction;

/// Handle `task add|list|show`
pub fn task(action: TaskAction, caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    match action {
        TaskAction::Add {
            id,
            description,
            priority,
            depends_on,
        } => {
            let mut spec = TaskSpec::new(id, description).depends_on(depends_on);
            if let Some(priority) = priority {
                spec = spec.priority(priority);
            }
            let task = enforcer.declare_task(caller, spec)?;
            show(&enforcer, &task.id, mode)
        }
        TaskAction::List { status } => {
            let tasks = enforcer
                .tasks()?
                .into_iter()
                .filter(|t| status.is_none_or(|s| t.status == s))
                .collect();
            TaskListResult { tasks }.render(mode);
            Ok(0)
        }
        TaskAction::Show { id } => show(&enforcer, &id, mode),
    }
}

fn show(enforcer: &FileEnforcer, id: &str, mode: OutputMode) -> anyhow::Result<u8> {
    let state = enforcer.state()?;
    let task = state.task(id)?.clone();
    TaskReport {
        work_log_open: state.work_log_open(id),
        requirements: enforcer.completion_requirements(id)?,
        task,
    }
    .render(mode);
    Ok(0)
}

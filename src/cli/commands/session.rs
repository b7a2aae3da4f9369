//! Selecting, releasing and inspecting the active task

use taskwarden::Caller;
use taskwarden::output::{ActiveResult, OperationResult, OutputMode};

/// Select a task for the caller
pub fn select(id: &str, caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    let task = enforcer.select(caller, id)?;
    OperationResult::ok(format!(
        "{caller} selected {}: {}\nSubmit a work log before acting: taskwarden work-log template {}",
        task.id, task.description, task.id
    ))
    .render(mode);
    Ok(0)
}

/// Release a task back to the pool
pub fn release(id: &str, caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    let task = enforcer.release(caller, id)?;
    OperationResult::ok(format!("{caller} released {}", task.id)).render(mode);
    Ok(0)
}

/// Show the caller's active task
pub fn active(caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    ActiveResult {
        identity: caller.identity().to_string(),
        task: enforcer.get_active(caller)?,
    }
    .render(mode);
    Ok(0)
}

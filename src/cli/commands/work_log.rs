//! Work-log gate commands

use std::fs;

use anyhow::{Context, bail};
use taskwarden::Caller;
use taskwarden::adapters::markdown::{latest_artifact, load_work_log};
use taskwarden::core::models::WorkLogGate;
use taskwarden::output::{GateReport, OperationResult, OutputMode};
use taskwarden::paths;

use crate::cli::app::WorkLogAction;

/// Handle `work-log template|submit|status`
pub fn work_log(action: WorkLogAction, caller: &Caller, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    match action {
        WorkLogAction::Template { id, write } => {
            let gate = enforcer.require_work_log(caller, &id)?;
            if let WorkLogGate::Closed(template) = &gate {
                if write {
                    if let Some(dir) = template.suggested_path.parent() {
                        fs::create_dir_all(dir)
                            .with_context(|| format!("create {}", dir.display()))?;
                    }
                    fs::write(&template.suggested_path, &template.markdown).with_context(|| {
                        format!("write {}", template.suggested_path.display())
                    })?;
                } else if mode == OutputMode::Human {
                    print!("{}", template.markdown);
                    return Ok(0);
                }
            }
            GateReport { task_id: id, gate }.render(mode);
            Ok(0)
        }
        WorkLogAction::Submit { id, file } => {
            let root = paths::project_root();
            let path = match file {
                Some(path) => path,
                None => match latest_artifact(&root, &id) {
                    Some(path) => path,
                    None => bail!(
                        "no work log found for {id} under {}; run 'taskwarden work-log template {id} --write' first",
                        paths::work_log_dir(&root).display()
                    ),
                },
            };
            let record = load_work_log(&path)?;
            log::debug!("submitting {} for {id}", path.display());
            let task = enforcer.submit_work_log(caller, &id, record)?;
            OperationResult::ok(format!(
                "Work log accepted for {} ({}); {} is now {}",
                task.id,
                path.display(),
                task.id,
                task.status
            ))
            .render(mode);
            Ok(0)
        }
        WorkLogAction::Status { id } => {
            let gate = enforcer.require_work_log(caller, &id)?;
            let code = if gate.is_open() { 0 } else { 4 };
            GateReport { task_id: id, gate }.render(mode);
            Ok(code)
        }
    }
}

//! Action validation command

use anyhow::Context;
use taskwarden::output::{OutputMode, ValidationReport};
use taskwarden::{ActionRequest, Caller};

/// Validate an action and exit with the decision's code
pub fn validate_action(
    task_id: &str,
    action: &str,
    justification: &str,
    context: Option<&str>,
    caller: &Caller,
    mode: OutputMode,
) -> anyhow::Result<u8> {
    let mut request = ActionRequest::new(task_id, action, justification);
    if let Some(raw) = context {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("--context must be valid JSON")?;
        request = request.with_context(value);
    }

    let enforcer = super::open()?;
    let report = ValidationReport::new("validate_action", enforcer.validate_action(caller, &request)?);
    report.render(mode);
    Ok(report.exit_code())
}

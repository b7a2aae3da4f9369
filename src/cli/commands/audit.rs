//! Audit log inspection

use taskwarden::output::{AuditListResult, OutputMode, SummaryReport};

use crate::cli::app::AuditAction;

/// Handle `audit list|summary`
pub fn audit(action: AuditAction, mode: OutputMode) -> anyhow::Result<u8> {
    let enforcer = super::open()?;
    match action {
        AuditAction::List { task, limit } => {
            let mut events = match task {
                Some(task_id) => enforcer.audit_events_for(&task_id)?,
                None => enforcer.audit_events()?,
            };
            if let Some(limit) = limit {
                let skip = events.len().saturating_sub(limit);
                events.drain(..skip);
            }
            AuditListResult { events }.render(mode);
        }
        AuditAction::Summary => SummaryReport {
            summary: enforcer.audit_summary()?,
        }
        .render(mode),
    }
    Ok(0)
}

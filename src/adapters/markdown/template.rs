//! Work-log skeleton writer

use std::fmt::Write;

use crate::core::models::Task;

/// Items every pre-work checklist starts with
const PRE_WORK_ITEMS: &[&str] = &[
    "Read the task description and its dependencies",
    "Identify the files that will change",
    "Decide how the result will be validated",
];

/// Items every final validation checklist starts with
const FINAL_ITEMS: &[&str] = &[
    "All validation commands pass",
    "Files exist as expected",
    "Evidence collected for every required category",
    "Ready for review",
];

/// Markdown skeleton for a task's work log
#[must_use]
pub fn render_template(task: &Task, started: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Work Log: {}", task.id);
    out.push('\n');
    out.push_str("## Task Information\n");
    let _ = writeln!(out, "- **Task ID:** {}", task.id);
    let _ = writeln!(out, "- **Description:** {}", task.description);
    let tier = task.risk_tier.map_or_else(|| "unclassified".to_string(), |t| t.to_string());
    let _ = writeln!(out, "- **Risk Level:** {tier}");
    let _ = writeln!(out, "- **Start Time:** {started}");
    out.push('\n');

    out.push_str("## Pre-Work Checklist\n");
    for item in PRE_WORK_ITEMS {
        let _ = writeln!(out, "- [ ] {item}");
    }
    out.push('\n');

    out.push_str("## Work Steps\n");
    out.push_str("### Step 1\n");
    out.push_str("- **Action:**\n");
    out.push_str("- **Expected Result:**\n");
    out.push_str("- **Actual Result:**\n");
    out.push_str("- **Validation Command:**\n");
    out.push_str("- **Files Modified:**\n");
    out.push('\n');

    out.push_str("## Final Validation\n");
    for item in FINAL_ITEMS {
        let _ = writeln!(out, "- [ ] {item}");
    }
    out
}

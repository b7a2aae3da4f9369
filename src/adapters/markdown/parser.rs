//! Work-log markdown parser
//!
//! Reads the fields the gate cares about and nothing else. Prose around the
//! fields is ignored; the parser checks structure, not writing quality.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::core::models::WorkLogRecord;
use crate::paths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    PreWork,
    Final,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Action,
    Expected,
    Actual,
    Command,
    Files,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "action" | "attempted" | "what was attempted" => Some(Self::Action),
            "expected result" | "expected" => Some(Self::Expected),
            "actual result" | "actual" => Some(Self::Actual),
            "validation command" | "validation" => Some(Self::Command),
            "files modified" | "files touched" | "files" => Some(Self::Files),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Steps {
    action: Vec<String>,
    expected: Vec<String>,
    actual: Vec<String>,
    command: Vec<String>,
}

impl Steps {
    fn slot(&mut self, field: Field) -> Option<&mut Vec<String>> {
        match field {
            Field::Action => Some(&mut self.action),
            Field::Expected => Some(&mut self.expected),
            Field::Actual => Some(&mut self.actual),
            Field::Command => Some(&mut self.command),
            Field::Files => None,
        }
    }
}

/// Split `- **Label:** value` into label and value
fn bold_field(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix("- **").or_else(|| line.trim_start().strip_prefix("* **"))?;
    let (label, value) = rest.split_once("**")?;
    let label = label.trim_end_matches(':');
    let value = value.trim_start_matches(':');
    Some((label, value.trim()))
}

/// Checklist item text with its checkbox, e.g. `[x] Files exist`
fn checklist_item(line: &str) -> Option<String> {
    let rest = line.trim_start().strip_prefix("- ").or_else(|| line.trim_start().strip_prefix("* "))?;
    let (mark, text) = if let Some(text) = rest.strip_prefix("[ ]") {
        (" ", text)
    } else if let Some(text) = rest.strip_prefix("[x]").or_else(|| rest.strip_prefix("[X]")) {
        ("x", text)
    } else {
        return None;
    };
    let text = text.trim();
    (!text.is_empty()).then(|| format!("[{mark}] {text}"))
}

fn push_files(files: &mut Vec<String>, value: &str) {
    files.extend(
        value
            .split(',')
            .map(|f| f.trim().trim_matches('`').trim())
            .filter(|f| !f.is_empty())
            .map(String::from),
    );
}

/// Parse a work-log markdown document
///
/// The returned record is never marked complete; completeness is decided
/// when the record is submitted.
#[must_use]
pub fn parse_work_log(markdown: &str) -> WorkLogRecord {
    let mut record = WorkLogRecord::default();
    let mut heading_id = None;
    let mut section = Section::Other;
    let mut steps = Steps::default();
    let mut current: Option<Field> = None;

    for line in markdown.lines() {
        let trimmed = line.trim();

        if let Some(title) = trimmed.strip_prefix("# ") {
            if let Some(id) = title.trim().strip_prefix("Work Log:") {
                heading_id = Some(id.trim().to_string());
            }
            current = None;
            continue;
        }
        if let Some(title) = trimmed.strip_prefix("## ") {
            let title = title.trim().to_lowercase();
            section = if title.starts_with("pre-work") || title.starts_with("pre work") {
                Section::PreWork
            } else if title.starts_with("final validation") {
                Section::Final
            } else {
                Section::Other
            };
            current = None;
            continue;
        }
        if trimmed.starts_with('#') {
            current = None;
            continue;
        }

        if let Some((label, value)) = bold_field(line) {
            if label.eq_ignore_ascii_case("task id") {
                record.task_id = value.to_string();
                current = None;
                continue;
            }
            current = Field::from_label(label);
            match current {
                Some(Field::Files) => push_files(&mut record.files_touched, value),
                Some(field) if !value.is_empty() => {
                    if let Some(slot) = steps.slot(field) {
                        slot.push(value.to_string());
                    }
                }
                _ => {}
            }
            continue;
        }

        if let Some(item) = checklist_item(line) {
            match section {
                Section::PreWork => record.pre_work_checklist.push(item),
                Section::Final => record.final_checklist.push(item),
                Section::Other => {}
            }
            current = None;
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }
        match current {
            Some(Field::Files) => {
                let entry = trimmed.trim_start_matches(['-', '*']).trim();
                push_files(&mut record.files_touched, entry);
            }
            Some(field) => {
                if let Some(slot) = steps.slot(field) {
                    match slot.last_mut() {
                        Some(last) if !line.starts_with("- ") => {
                            last.push(' ');
                            last.push_str(trimmed);
                        }
                        _ => slot.push(trimmed.to_string()),
                    }
                }
            }
            None => {}
        }
    }

    if record.task_id.is_empty()
        && let Some(id) = heading_id
    {
        record.task_id = id;
    }
    record.attempted = steps.action.join("\n");
    record.expected = steps.expected.join("\n");
    record.actual = steps.actual.join("\n");
    record.validation_command = steps.command.join("\n");
    record
}

/// Read and parse a work-log file
pub fn load_work_log(path: &Path) -> anyhow::Result<WorkLogRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read work log {}", path.display()))?;
    Ok(parse_work_log(&content))
}

/// Work-log artifacts written for a task, oldest first
#[must_use]
pub fn find_artifacts(root: &Path, task_id: &str) -> Vec<PathBuf> {
    let dir = paths::work_log_dir(root);
    let prefix = paths::work_log_prefix(task_id);
    let mut found: Vec<PathBuf> = WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            name.starts_with(&prefix)
                && Path::new(&*name).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();
    found.sort();
    found
}

/// Most recent work-log artifact for a task
#[must_use]
pub fn latest_artifact(root: &Path, task_id: &str) -> Option<PathBuf> {
    find_artifacts(root, task_id).pop()
}

//! Centralized path definitions for taskwarden
//!
//! This module provides a single source of truth for all filesystem paths used by taskwarden.
//!
//! ## Storage Layout
//!
//! ```text
//! project/
//! ├── SESSION_STATE.json        # SHARED: tasks, assignments, work logs
//! ├── .taskwarden.toml          # SHARED: committed enforcement config
//! ├── work_logs/                # Markdown work-log artifacts
//! │   └── task_T1_20250101_120000.md
//! └── .taskwarden/              # Local state (gitignored)
//!     ├── state.lock            # Advisory lock guarding SESSION_STATE.json
//!     ├── audit.jsonl           # Append-only audit trail
//!     └── audit.lock            # Advisory lock guarding audit appends
//! ```

use std::path::{Path, PathBuf};

/// Session state filename
pub const STATE_FILE: &str = "SESSION_STATE.json";

/// Project configuration filename
pub const CONFIG_FILE: &str = ".taskwarden.toml";

/// Directory name for local taskwarden state
pub const TASKWARDEN_DIR: &str = ".taskwarden";

/// Work-log artifact directory
pub const WORK_LOG_DIR: &str = "work_logs";

const STATE_LOCK_FILE: &str = "state.lock";
const AUDIT_FILE: &str = "audit.jsonl";
const AUDIT_LOCK_FILE: &str = "audit.lock";

/// Find the project root.
///
/// Walks up from `start` looking for a state or config file and falls back
/// to `start` itself, so `init` works in a fresh directory.
#[must_use]
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(STATE_FILE).is_file() || dir.join(CONFIG_FILE).is_file())
        .unwrap_or(start)
        .to_path_buf()
}

/// Get the project root for the current directory.
#[must_use]
pub fn project_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_project_root(&cwd)
}

/// Get path to `SESSION_STATE.json`.
#[must_use]
pub fn state_file(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

/// Get path to `.taskwarden.toml`.
#[must_use]
pub fn config_file(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Get path to the `.taskwarden/` state directory.
#[must_use]
pub fn taskwarden_dir(root: &Path) -> PathBuf {
    root.join(TASKWARDEN_DIR)
}

/// Get path to the state lock file.
#[must_use]
pub fn state_lock(root: &Path) -> PathBuf {
    taskwarden_dir(root).join(STATE_LOCK_FILE)
}

/// Get path to `.taskwarden/audit.jsonl`.
#[must_use]
pub fn audit_log(root: &Path) -> PathBuf {
    taskwarden_dir(root).join(AUDIT_FILE)
}

/// Get path to the audit lock file.
#[must_use]
pub fn audit_lock(root: &Path) -> PathBuf {
    taskwarden_dir(root).join(AUDIT_LOCK_FILE)
}

/// Get path to the `work_logs/` directory.
#[must_use]
pub fn work_log_dir(root: &Path) -> PathBuf {
    root.join(WORK_LOG_DIR)
}

/// Suggested artifact path for a task's work log.
///
/// Characters that are awkward in filenames are replaced with `_`.
#[must_use]
pub fn work_log_artifact(root: &Path, task_id: &str, stamp: &str) -> PathBuf {
    work_log_dir(root).join(format!("task_{}_{stamp}.md", sanitize(task_id)))
}

/// Filename prefix shared by every artifact of a task
#[must_use]
pub fn work_log_prefix(task_id: &str) -> String {
    format!("task_{}_", sanitize(task_id))
}

fn sanitize(task_id: &str) -> String {
    task_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}

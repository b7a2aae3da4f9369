//! Markdown work-log artifacts
//!
//! Work logs are written by the agent as markdown files under `work_logs/`.
//! This module renders the skeleton, parses a filled-in file into a
//! `WorkLogRecord`, and finds the artifacts written for a task.

mod parser;
mod template;

pub use parser::{find_artifacts, latest_artifact, load_work_log, parse_work_log};
pub use template::render_template;

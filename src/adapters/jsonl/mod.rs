//! JSON Lines audit log
//!
//! Implements `AuditSink` as an append-only `.jsonl` file.

mod log_file;

pub use log_file::JsonlAuditLog;

//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `json/` - `SESSION_STATE.json` session store
//! - `jsonl/` - `.taskwarden/audit.jsonl` audit log
//! - `memory/` - In-memory store and audit log
//! - `command/` - Shell command evidence verifier
//! - `markdown/` - Work-log artifact templates and parsing
//! - `lock` - Advisory file locks shared by the file-backed adapters

pub mod command;
pub mod json;
pub mod jsonl;
pub mod lock;
pub mod markdown;
pub mod memory;

pub use command::CommandVerifier;
pub use json::JsonSessionStore;
pub use jsonl::JsonlAuditLog;
pub use memory::{MemoryAuditLog, MemorySessionStore};

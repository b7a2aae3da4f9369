//! taskwarden - Task-discipline enforcement for autonomous coding agents
//!
//! This library forces every agent-initiated action to be justified against one
//! explicitly selected task, gates work behind a completed work log, and requires
//! proof-backed completion before a task is marked done.

// Deny all clippy warnings in this crate
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod adapters;
pub mod config;
pub mod core;
pub mod enforcer;
pub mod error;
pub mod output;
pub mod paths;

pub use crate::core::models::{ActionRequest, ValidationResult, ValidationStatus};
pub use enforcer::{Caller, Enforcer};
pub use error::{EnforcerError, ErrorKind};

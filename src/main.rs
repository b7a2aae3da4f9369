//! taskwarden - Task-discipline enforcement for autonomous coding agents
//!
//! Exit codes: 0 approved or success, 2 rejected, 3 pending review,
//! 4 blocked, 1 any other error.

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

mod cli;

use std::process::ExitCode;

/// Main entry point for the taskwarden CLI
fn main() -> ExitCode {
    cli::run()
}

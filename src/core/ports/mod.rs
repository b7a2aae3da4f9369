//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the enforcement logic
//! and external systems (state file, audit log, verification commands).
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The enforcer depends only on these traits, never on concrete
//! implementations. In-memory implementations back the unit tests; the
//! JSON/JSONL implementations back the CLI.

mod audit_sink;
mod session_store;
mod verifier;

pub use audit_sink::AuditSink;
pub use session_store::SessionStore;
pub use verifier::{NoopVerifier, VerificationOutcome, Verifier};

//! Core domain logic for taskwarden
//!
//! This module contains pure business logic with no I/O dependencies.
//! All external interactions are abstracted through port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Task, SessionState, WorkLogRecord, ValidationResult, AuditEvent)
//! - `services/` - Pure decision logic (state machine, risk tiers, justification, rules)
//! - `ports/` - Trait definitions for the session store, audit sink and verifier

pub mod models;
pub mod ports;
pub mod services;

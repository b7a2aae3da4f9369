//! Domain models for taskwarden
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Task`] - A declared unit of work with a lifecycle status
//! - [`SessionState`] - The aggregate root persisted per project
//! - [`WorkLogRecord`] - Intent and outcome recorded before work begins
//! - [`ValidationResult`] - An immutable allow/deny decision
//! - [`ActionRequest`] - A proposed action and its justification
//! - [`ProofPackage`] - Evidence supplied when claiming completion
//! - [`AuditEvent`] - Append-only record of a decision
//! - [`RiskTier`] - How much automated approval is permitted

mod action;
mod audit;
mod proof;
mod risk;
mod session;
mod task;
mod validation;
mod work_log;

pub use action::ActionRequest;
pub use audit::{AuditEvent, Decision};
pub use proof::{CompletionRequirements, ProofPackage, RequirementSource};
pub use risk::RiskTier;
pub use session::{SessionState, Transition};
pub use task::{Priority, Task, TaskSpec, TaskStatus};
pub use validation::{ValidationResult, ValidationStatus};
pub use work_log::{REQUIRED_WORK_LOG_FIELDS, WorkLogGate, WorkLogRecord, WorkLogTemplate};

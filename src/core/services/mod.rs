//! Business logic services
//!
//! Pure decision logic that operates on domain models.
//! These services have no I/O dependencies - they operate on
//! data passed in and return results.
//!
//! - [`lifecycle`] - Legal task status transitions
//! - [`classifier`] - Risk tier classification
//! - [`justification`] - Justification length and keyword overlap
//! - [`rules`] - Custom validation rules
//! - [`requirements`] - Completion requirement lookup
//! - [`action`] - Action validation
//! - [`completion`] - Completion validation and routing
//! - [`summary`] - Audit analytics

pub mod action;
pub mod classifier;
pub mod completion;
pub mod justification;
pub mod lifecycle;
pub mod requirements;
pub mod rules;
pub mod summary;

pub use action::ActionPolicy;
pub use classifier::RiskClassifier;
pub use completion::CompletionPolicy;
pub use rules::{PatternRule, RuleContext, RuleSet, ValidationRule, Verdict};
pub use summary::{ActorSummary, AuditSummary};

//! Mock implementations of ports and rules
//!
//! These mocks provide scripted behavior and record how they were called.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use taskwarden::core::models::ActionRequest;
use taskwarden::core::ports::{VerificationOutcome, Verifier};
use taskwarden::core::services::{RuleContext, ValidationRule, Verdict};

/// Verifier that fails the listed categories and records every call
#[derive(Debug, Default)]
pub struct MockVerifier {
    handled: BTreeSet<String>,
    failing: BTreeSet<String>,
    timing_out: BTreeSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockVerifier {
    pub fn handling(categories: &[&str]) -> Self {
        Self {
            handled: categories.iter().map(|c| (*c).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing(mut self, category: &str) -> Self {
        self.failing.insert(category.to_string());
        self
    }

    pub fn timing_out(mut self, category: &str) -> Self {
        self.timing_out.insert(category.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Verifier for MockVerifier {
    fn handles(&self, category: &str) -> bool {
        self.handled.contains(category)
    }

    fn verify(&self, category: &str, evidence: &str) -> anyhow::Result<VerificationOutcome> {
        self.calls.lock().unwrap().push(category.to_string());
        Ok(if self.timing_out.contains(category) {
            VerificationOutcome::timed_out(format!("timed out after 1s\n{evidence}"))
        } else if self.failing.contains(category) {
            VerificationOutcome::failed(format!("exit 1\nassertion failed in {category}"))
        } else {
            VerificationOutcome::passed(evidence)
        })
    }
}

/// Shared handle for a verifier that is moved into the enforcer
#[derive(Debug, Clone)]
pub struct SharedVerifier(pub Arc<MockVerifier>);

impl Verifier for SharedVerifier {
    fn handles(&self, category: &str) -> bool {
        self.0.handles(category)
    }

    fn verify(&self, category: &str, evidence: &str) -> anyhow::Result<VerificationOutcome> {
        self.0.verify(category, evidence)
    }
}

/// Rule returning a fixed verdict and counting evaluations
#[derive(Debug)]
pub struct FixedRule {
    name: String,
    verdict: Verdict,
    calls: Arc<AtomicUsize>,
}

impl FixedRule {
    pub fn new(name: &str, verdict: Verdict) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                verdict,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl ValidationRule for FixedRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _action: &ActionRequest, _context: &RuleContext<'_>) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}

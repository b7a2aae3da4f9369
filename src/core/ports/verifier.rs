//! Evidence verifier port
//!
//! Completion proof may optionally be re-checked by an external process
//! (running a test command, for example). The enforcer only sees this trait.

/// Result of re-verifying one evidence category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VerificationOutcome {
    /// Whether the evidence held up
    pub passed: bool,
    /// Captured output, used in the rejection reason
    pub output: String,
    /// Whether the check was killed for exceeding its time budget
    pub timed_out: bool,
}

impl VerificationOutcome {
    /// Passing outcome
    #[must_use]
    pub fn passed(output: impl Into<String>) -> Self {
        Self {
            passed: true,
            output: output.into(),
            timed_out: false,
        }
    }

    /// Failing outcome
    #[must_use]
    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
            timed_out: false,
        }
    }

    /// Outcome for a check that ran out of time
    #[must_use]
    pub fn timed_out(output: impl Into<String>) -> Self {
        Self {
            passed: false,
            output: output.into(),
            timed_out: true,
        }
    }
}

/// Re-checks submitted evidence
pub trait Verifier: std::fmt::Debug + Send + Sync {
    /// Whether this verifier knows how to check `category`
    fn handles(&self, category: &str) -> bool;

    /// Re-check the evidence for one category
    ///
    /// An `Err` means the check could not be run at all; it is treated the
    /// same as a failed check.
    fn verify(&self, category: &str, evidence: &str) -> anyhow::Result<VerificationOutcome>;
}

/// Verifier that checks nothing; evidence is accepted on presence alone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVerifier;

impl Verifier for NoopVerifier {
    fn handles(&self, _category: &str) -> bool {
        false
    }

    fn verify(&self, _category: &str, _evidence: &str) -> anyhow::Result<VerificationOutcome> {
        Ok(VerificationOutcome::passed(""))
    }
}

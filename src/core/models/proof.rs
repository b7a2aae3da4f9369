//! Proof packages and completion requirements
//!
//! A proof package maps evidence categories to evidence text. It is supplied
//! wholesale by the caller; validation only checks presence and shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::RiskTier;

/// Evidence category name -> evidence text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofPackage(BTreeMap<String, String>);

impl ProofPackage {
    /// Empty package
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a category
    #[must_use]
    pub fn with(mut self, category: impl Into<String>, evidence: impl Into<String>) -> Self {
        self.0.insert(category.into(), evidence.into());
        self
    }

    /// Evidence for a category
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&str> {
        self.0.get(category).map(String::as_str)
    }

    /// Required categories that are absent or blank, in the order given
    #[must_use]
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|category| self.get(category).is_none_or(|e| e.trim().is_empty()))
            .cloned()
            .collect()
    }

    /// Required categories whose evidence contains an ambiguity marker
    ///
    /// Markers are matched case-insensitively as whole words.
    #[must_use]
    pub fn ambiguous(&self, required: &[String], markers: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|category| {
                self.get(category).is_some_and(|evidence| {
                    let lowered = evidence.to_lowercase();
                    let words: Vec<&str> = lowered
                        .split(|c: char| !c.is_alphanumeric() && c != '/')
                        .filter(|w| !w.is_empty())
                        .collect();
                    markers.iter().any(|m| {
                        let m = m.to_lowercase();
                        words.iter().any(|w| *w == m)
                    })
                })
            })
            .cloned()
            .collect()
    }

    /// Iterate over categories and evidence
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of categories supplied
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProofPackage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Where a task's required evidence categories came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum RequirementSource {
    /// Exact task id entry in the session's validation requirements
    Task,
    /// A glob pattern entry in the session's validation requirements
    Pattern(String),
    /// Configured defaults for the task's risk tier
    TierDefault,
}

impl std::fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task => write!(f, "task entry"),
            Self::Pattern(p) => write!(f, "pattern {p}"),
            Self::TierDefault => write!(f, "tier default"),
        }
    }
}

/// What must be proven before a task can complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequirements {
    /// Task the requirements apply to
    pub task_id: String,
    /// Risk tier of the task
    pub tier: RiskTier,
    /// Required evidence categories
    pub categories: Vec<String>,
    /// Where the categories came from
    pub source: RequirementSource,
    /// Commands that would produce useful evidence
    pub suggested_commands: Vec<String>,
}

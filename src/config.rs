//! Project configuration
//!
//! Enforcement settings live in `.taskwarden.toml` at the project root.
//! A missing file means defaults; a malformed file or an invalid regex is a
//! configuration error, never silently ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::core::models::RiskTier;
use crate::error::EnforcerError;

/// Full enforcement configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Enforcement level and locking
    #[serde(default)]
    pub enforcement: EnforcementConfig,
    /// Justification thresholds
    #[serde(default)]
    pub justification: JustificationConfig,
    /// Risk classification patterns
    #[serde(default)]
    pub risk: RiskConfig,
    /// Completion proof settings
    #[serde(default)]
    pub proof: ProofConfig,
    /// External evidence verification
    #[serde(default)]
    pub verification: VerificationConfig,
    /// Custom action rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleConfig>,
}

/// How strictly decisions are routed to human review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// MEDIUM actions and every non-LOW completion also need review
    Strict,
    /// HIGH actions and non-LOW or ambiguous completions need review
    #[default]
    Moderate,
    /// Nothing waits for review; only rejections and blocks stop the caller
    Permissive,
}

impl std::fmt::Display for EnforcementLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Moderate => write!(f, "moderate"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

impl std::str::FromStr for EnforcementLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "moderate" => Ok(Self::Moderate),
            "permissive" => Ok(Self::Permissive),
            _ => Err(format!("Invalid enforcement level: {s}. Use: strict, moderate, permissive")),
        }
    }
}

/// `[enforcement]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Review routing level
    #[serde(default)]
    pub level: EnforcementLevel,
    /// How long a mutation waits for the state lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

const fn default_lock_timeout_ms() -> u64 {
    5000
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            level: EnforcementLevel::default(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// `[justification]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JustificationConfig {
    /// Minimum trimmed length in characters
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Minimum number of keywords shared with the task
    #[serde(default = "default_min_overlap")]
    pub min_keyword_overlap: usize,
}

const fn default_min_length() -> usize {
    20
}

const fn default_min_overlap() -> usize {
    1
}

impl Default for JustificationConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            min_keyword_overlap: default_min_overlap(),
        }
    }
}

/// `[risk]` section; patterns are case-insensitive regexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Matches classify as HIGH
    #[serde(default = "default_human_review_patterns")]
    pub human_review_patterns: Vec<String>,
    /// Matches classify as LOW
    #[serde(default = "default_auto_approve_patterns")]
    pub auto_approve_patterns: Vec<String>,
    /// Matches classify as MEDIUM
    #[serde(default = "default_medium_patterns")]
    pub medium_patterns: Vec<String>,
    /// Tier for text no pattern matches
    #[serde(default)]
    pub default_tier: RiskTier,
}

fn default_human_review_patterns() -> Vec<String> {
    ["deploy", "security", "auth", "database", "kubernetes", "production"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_auto_approve_patterns() -> Vec<String> {
    [r"^(read|list|view|show|cat|ls)\b", r"\bdocs?\b", "documentation", "readme"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_medium_patterns() -> Vec<String> {
    ["implement", "refactor", "api", "service", "docker"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            human_review_patterns: default_human_review_patterns(),
            auto_approve_patterns: default_auto_approve_patterns(),
            medium_patterns: default_medium_patterns(),
            default_tier: RiskTier::default(),
        }
    }
}

/// `[proof]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofConfig {
    /// Words that make evidence ambiguous and force review
    #[serde(default = "default_ambiguous_markers")]
    pub ambiguous_markers: Vec<String>,
    /// Required categories per tier
    #[serde(default)]
    pub defaults: TierDefaults,
}

fn default_ambiguous_markers() -> Vec<String> {
    ["todo", "tbd", "n/a", "skipped"].into_iter().map(String::from).collect()
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            ambiguous_markers: default_ambiguous_markers(),
            defaults: TierDefaults::default(),
        }
    }
}

/// `[proof.defaults]`: required evidence categories by tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDefaults {
    /// LOW tier categories
    #[serde(default = "default_low_categories")]
    pub low: Vec<String>,
    /// MEDIUM tier categories
    #[serde(default = "default_medium_categories")]
    pub medium: Vec<String>,
    /// HIGH tier categories
    #[serde(default = "default_high_categories")]
    pub high: Vec<String>,
}

fn default_low_categories() -> Vec<String> {
    ["file_evidence", "functional_test", "error_check"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_medium_categories() -> Vec<String> {
    let mut categories = default_low_categories();
    categories.extend(["integration_test", "syntax_validation"].map(String::from));
    categories
}

fn default_high_categories() -> Vec<String> {
    let mut categories = default_medium_categories();
    categories.extend(["comprehensive_testing", "security_check"].map(String::from));
    categories
}

impl Default for TierDefaults {
    fn default() -> Self {
        Self {
            low: default_low_categories(),
            medium: default_medium_categories(),
            high: default_high_categories(),
        }
    }
}

impl TierDefaults {
    /// Categories required for a tier
    #[must_use]
    pub fn for_tier(&self, tier: RiskTier) -> &[String] {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::Medium => &self.medium,
            RiskTier::High => &self.high,
        }
    }
}

/// `[verification]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Category -> shell command template (`{evidence}`, `{command}` placeholders)
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
    /// Per-category time budget
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// What a matching `[[rules]]` entry does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleVerdict {
    /// Refuse the action
    Reject,
    /// Block the action
    Block,
    /// Send the action to human review
    Escalate,
}

/// One `[[rules]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name, reported in results and audit events
    pub name: String,
    /// Regex matched case-insensitively against the action text
    pub pattern: String,
    /// Outcome on match
    pub verdict: RuleVerdict,
    /// Reason given on match
    #[serde(default)]
    pub message: String,
}

impl Config {
    /// Load configuration from `path`
    ///
    /// A missing file yields defaults. Unparseable TOML or an invalid
    /// pattern fails with [`EnforcerError::Config`].
    pub fn load(path: &Path) -> Result<Self, EnforcerError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| EnforcerError::storage(path, e))?;
        let config = Self::parse(&content)?;
        log::debug!(
            "loaded config from {} (level {})",
            path.display(),
            config.enforcement.level
        );
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn parse(content: &str) -> Result<Self, EnforcerError> {
        let config: Self =
            toml::from_str(content).map_err(|e| EnforcerError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every pattern compiles and thresholds make sense
    pub fn validate(&self) -> Result<(), EnforcerError> {
        let risk = &self.risk;
        for pattern in risk
            .human_review_patterns
            .iter()
            .chain(&risk.auto_approve_patterns)
            .chain(&risk.medium_patterns)
            .chain(self.rules.iter().map(|r| &r.pattern))
        {
            compile_pattern(pattern)?;
        }
        if let Some(rule) = self.rules.iter().find(|r| r.name.trim().is_empty()) {
            return Err(EnforcerError::Config(format!(
                "rule with pattern '{}' has no name",
                rule.pattern
            )));
        }
        if self.verification.timeout_secs == 0 {
            return Err(EnforcerError::Config(
                "verification.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Render as TOML (used by `init`)
    pub fn to_toml(&self) -> Result<String, EnforcerError> {
        toml::to_string_pretty(self).map_err(|e| EnforcerError::Config(e.to_string()))
    }
}

/// Compile a case-insensitive pattern, mapping failure to a config error
pub fn compile_pattern(pattern: &str) -> Result<Regex, EnforcerError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| EnforcerError::Config(format!("invalid pattern '{pattern}': {e}")))
}

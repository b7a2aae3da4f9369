//! Risk tiers
//!
//! Defines how much automated approval an action or task is allowed.

use serde::{Deserialize, Serialize};

/// Risk tier, ordered from least to most scrutiny
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Documentation, file listings - may be approved automatically
    #[default]
    Low,
    /// Code changes, configuration
    Medium,
    /// Architecture, security, deployment - needs a human
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for RiskTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Invalid risk tier: {s}. Use: low, medium, high")),
        }
    }
}

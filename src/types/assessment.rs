//! Risk assessment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SCORE_HIGH_RISK, SCORE_MODERATE_RISK};

/// Emotional-risk classification for a subject at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify an integer risk score: >= 6 high, >= 3 moderate, else low
    pub fn from_score(score: i32) -> Self {
        if score >= SCORE_HIGH_RISK {
            RiskLevel::High
        } else if score >= SCORE_MODERATE_RISK {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            RiskLevel::Low => "\x1b[32m",      // Green
            RiskLevel::Moderate => "\x1b[33m", // Yellow
            RiskLevel::High => "\x1b[31m",     // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// A computed risk classification plus rationale. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Store-assigned record id
    pub id: u64,
    /// Owning subject
    pub subject_id: u64,
    /// When the assessment was computed
    pub assessed_at: DateTime<Utc>,
    /// Classified risk level
    pub risk_level: RiskLevel,
    /// Human-readable rationale phrases, in scoring order
    pub rationale: String,
}

impl Assessment {
    /// Create a new assessment stamped with the current time
    pub fn new(id: u64, subject_id: u64, risk_level: RiskLevel, rationale: impl Into<String>) -> Self {
        Self {
            id,
            subject_id,
            assessed_at: Utc::now(),
            risk_level,
            rationale: rationale.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_boundaries_are_exact() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(2), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(5), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(10), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Moderate).unwrap(), "\"moderate\"");
    }
}

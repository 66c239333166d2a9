//! Intervention recommendation model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

/// A suggested intervention tied to a risk level. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Store-assigned record id
    pub id: u64,
    /// Owning subject
    pub subject_id: u64,
    /// When the recommendation was issued
    pub issued_at: DateTime<Utc>,
    /// Intervention text, drawn from the fixed pool for the risk level
    pub text: String,
    /// Risk level the text was selected for
    pub risk_level: RiskLevel,
    /// Fixed annotation marking the origin of the recommendation
    pub notes: String,
}

impl Recommendation {
    /// Create a new recommendation stamped with the current time
    pub fn new(
        id: u64,
        subject_id: u64,
        text: impl Into<String>,
        risk_level: RiskLevel,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id,
            subject_id,
            issued_at: Utc::now(),
            text: text.into(),
            risk_level,
            notes: notes.into(),
        }
    }
}

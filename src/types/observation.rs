//! Health observation model
//!
//! One observation = one simulated reading of sleep, mood, activity and
//! heart-rate signals for a subject. History is append-only per subject.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Self-reported mood for one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mood::Positive => "positive",
            Mood::Neutral => "neutral",
            Mood::Negative => "negative",
        };
        write!(f, "{}", name)
    }
}

/// Physical activity level for one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Intense,
    Moderate,
    Light,
    Sedentary,
    None,
}

impl ActivityLevel {
    /// Sedentary and none both score as insufficient activity
    pub fn is_inactive(&self) -> bool {
        matches!(self, ActivityLevel::Sedentary | ActivityLevel::None)
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActivityLevel::Intense => "intense",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Light => "light",
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Observation fields before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationDraft {
    pub collected_on: NaiveDate,
    pub sleep_hours: f64,
    pub sleep_quality: i32,
    pub mood: Mood,
    pub activity_level: ActivityLevel,
    pub heart_rate: i32,
}

/// One stored reading of health signals for a subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Store-assigned record id
    pub id: u64,
    /// Owning subject
    pub subject_id: u64,
    /// Collection date
    pub collected_on: NaiveDate,
    /// Hours slept
    pub sleep_hours: f64,
    /// Sleep quality on a 1-5 scale
    pub sleep_quality: i32,
    /// Self-reported mood
    pub mood: Mood,
    /// Physical activity level
    pub activity_level: ActivityLevel,
    /// Heart rate in bpm
    pub heart_rate: i32,
}

impl Observation {
    /// Create an observation from a draft and store-assigned id
    pub fn from_draft(id: u64, subject_id: u64, draft: ObservationDraft) -> Self {
        Self {
            id,
            subject_id,
            collected_on: draft.collected_on,
            sleep_hours: draft.sleep_hours,
            sleep_quality: draft.sleep_quality,
            mood: draft.mood,
            activity_level: draft.activity_level,
            heart_rate: draft.heart_rate,
        }
    }

    /// Check the signal fields are inside their physical domain.
    ///
    /// The simulator never produces values outside these bounds; the check
    /// guards data read back through the storage seam.
    pub fn validate(&self) -> Result<(), String> {
        if !self.sleep_hours.is_finite() || !(0.0..=24.0).contains(&self.sleep_hours) {
            return Err(format!("sleep_hours out of range: {}", self.sleep_hours));
        }
        if !(1..=5).contains(&self.sleep_quality) {
            return Err(format!("sleep_quality out of range: {}", self.sleep_quality));
        }
        if !(20..=250).contains(&self.heart_rate) {
            return Err(format!("heart_rate out of range: {}", self.heart_rate));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

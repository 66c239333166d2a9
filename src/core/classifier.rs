//! Risk classifier: deterministic threshold scoring plus trend detection
//!
//! Per subject per tick, reads the trailing observation window (most recent
//! first), scores the latest observation against five fixed conditions, then
//! augments the rationale with persistence trends over the leading entries of
//! the window. Score and risk level are a pure function of the window.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::core::HealthStore;
use crate::types::{
    MonitorError, Mood, Observation, RiskLevel, SkipReason, SubjectOutcome, TickReport,
};
use crate::{
    HEART_RATE_HIGH, HEART_RATE_LOW, OBSERVATION_WINDOW_DAYS, POINTS_ABNORMAL_HEART_RATE,
    POINTS_INSUFFICIENT_ACTIVITY, POINTS_INSUFFICIENT_SLEEP, POINTS_NEGATIVE_MOOD,
    POINTS_POOR_SLEEP_QUALITY, SLEEP_HOURS_LOW, SLEEP_QUALITY_LOW, TREND_MIN_RUN,
};

/// Task name for tick reports and scheduling
pub const CLASSIFIER_TASK: &str = "risk-classifier";

/// Rationale when no condition and no trend triggered
pub const PHRASE_NORMAL: &str = "Indicators within normal range.";

/// Fixed rationale phrases without a numeric slot
pub const PHRASE_NEGATIVE_MOOD: &str = "Negative mood.";
pub const PHRASE_INSUFFICIENT_ACTIVITY: &str = "Insufficient physical activity.";
pub const PHRASE_MOOD_TREND: &str = "Persistent negative mood trend.";
pub const PHRASE_SLEEP_TREND: &str = "Persistent inadequate sleep pattern.";

/// Deterministic scoring result for one observation window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScore {
    /// Summed points of all triggered conditions
    pub score: i32,
    /// Classification of the score
    pub level: RiskLevel,
    /// Rationale phrases joined in scoring order
    pub rationale: String,
}

/// Score a non-empty window, most recent observation first.
///
/// Conditions are summed in a fixed order and each contributes its phrase.
/// Trend phrases apply only when the window has more than one entry and the
/// leading run (starting at the most recent entry) reaches two.
pub fn score_window(window: &[Observation]) -> Result<RiskScore, String> {
    let latest = window.first().ok_or("empty observation window")?;
    latest.validate()?;

    let mut score = 0;
    let mut phrases: Vec<String> = Vec::new();

    if latest.sleep_hours < SLEEP_HOURS_LOW {
        score += POINTS_INSUFFICIENT_SLEEP;
        phrases.push(format!("Insufficient sleep ({:.1}h).", latest.sleep_hours));
    }
    if latest.sleep_quality < SLEEP_QUALITY_LOW {
        score += POINTS_POOR_SLEEP_QUALITY;
        phrases.push(format!("Poor sleep quality ({}/5).", latest.sleep_quality));
    }
    if latest.mood == Mood::Negative {
        score += POINTS_NEGATIVE_MOOD;
        phrases.push(PHRASE_NEGATIVE_MOOD.to_string());
    }
    if latest.activity_level.is_inactive() {
        score += POINTS_INSUFFICIENT_ACTIVITY;
        phrases.push(PHRASE_INSUFFICIENT_ACTIVITY.to_string());
    }
    if latest.heart_rate > HEART_RATE_HIGH || latest.heart_rate < HEART_RATE_LOW {
        score += POINTS_ABNORMAL_HEART_RATE;
        phrases.push(format!("Abnormal heart rate ({} bpm).", latest.heart_rate));
    }

    if window.len() > 1 {
        if leading_run(window, |o| o.mood == Mood::Negative) >= TREND_MIN_RUN {
            phrases.push(PHRASE_MOOD_TREND.to_string());
        }
        if leading_run(window, |o| o.sleep_hours < SLEEP_HOURS_LOW) >= TREND_MIN_RUN {
            phrases.push(PHRASE_SLEEP_TREND.to_string());
        }
    }

    let level = RiskLevel::from_score(score);
    let rationale = if phrases.is_empty() {
        PHRASE_NORMAL.to_string()
    } else {
        phrases.join(" ")
    };

    Ok(RiskScore {
        score,
        level,
        rationale,
    })
}

/// Length of the run of entries satisfying `pred`, starting at the most
/// recent entry and breaking on the first miss
fn leading_run<F>(window: &[Observation], pred: F) -> usize
where
    F: Fn(&Observation) -> bool,
{
    window.iter().take_while(|&o| pred(o)).count()
}

/// Assesses emotional risk for every registered subject once per tick.
pub struct RiskClassifier {
    store: Arc<dyn HealthStore>,
}

impl RiskClassifier {
    /// Create a classifier over a shared store
    pub fn new(store: Arc<dyn HealthStore>) -> Self {
        Self { store }
    }

    /// Assess every subject in the registry snapshot
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::new(CLASSIFIER_TASK);

        let subjects = match self.store.list_subjects().await {
            Ok(subjects) => subjects,
            Err(err) => {
                error!(task = CLASSIFIER_TASK, %err, "could not snapshot subject registry");
                return report;
            }
        };

        for subject in &subjects {
            let outcome = self.assess_subject(subject.id, &subject.name).await;
            report.record(subject.id, outcome);
        }

        report
    }

    /// Assess one subject: read the window, score, append an assessment
    async fn assess_subject(&self, subject_id: u64, name: &str) -> SubjectOutcome {
        let window = match self
            .store
            .recent_observations(subject_id, OBSERVATION_WINDOW_DAYS)
            .await
        {
            Ok(window) => window,
            Err(err) => return SubjectOutcome::Failed(err.into()),
        };

        // An empty window is expected when the classifier outpaces the
        // collector; the next tick will see data.
        if window.is_empty() {
            return SubjectOutcome::Skipped(SkipReason::EmptyWindow);
        }

        // A malformed latest observation is a data error: no partial
        // assessment is written and the tick moves on.
        let scored = match score_window(&window) {
            Ok(scored) => scored,
            Err(detail) => return SubjectOutcome::Failed(MonitorError::Data(detail)),
        };

        match self
            .store
            .append_assessment(subject_id, scored.level, scored.rationale.clone())
            .await
        {
            Ok(_) => {
                info!(
                    subject = %name,
                    risk = %scored.level,
                    score = scored.score,
                    rationale = %scored.rationale,
                    "assessment recorded"
                );
                if scored.level != RiskLevel::Low {
                    warn!(subject = %name, risk = %scored.level, "elevated emotional risk detected");
                }
                SubjectOutcome::Processed
            }
            Err(err) => SubjectOutcome::Failed(err.into()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

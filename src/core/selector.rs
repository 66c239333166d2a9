//! Recommendation selector: turns the latest risk assessment into an
//! intervention suggestion
//!
//! Per subject per tick, resolves the most recently persisted assessment
//! (no assessment yet counts as low risk) and draws one text uniformly from
//! the fixed candidate pool for that level.

use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{error, info, warn};

use crate::core::HealthStore;
use crate::types::{RiskLevel, SubjectOutcome, TickReport};

/// Task name for tick reports and scheduling
pub const SELECTOR_TASK: &str = "recommendation-selector";

/// Annotation attached to every generated recommendation
pub const AUTO_GENERATED_NOTE: &str = "Automatically generated from the latest risk assessment";

/// Intervention candidates for low risk
pub const LOW_RISK_ACTIONS: [&str; 5] = [
    "Keep up your healthy routine",
    "Practice breathing exercises for 5 minutes",
    "Listen to relaxing music",
    "Take a light walk",
    "Stay in touch with family and friends",
];

/// Intervention candidates for moderate risk
pub const MODERATE_RISK_ACTIONS: [&str; 7] = [
    "Practice deep breathing exercises for 10 minutes",
    "Take a 15-20 minute walk",
    "Practice meditation or mindfulness",
    "Talk with a family member or friend",
    "Listen to calm, relaxing music",
    "Do some gentle stretching",
    "Have a calming tea such as chamomile or lemon balm",
];

/// Intervention candidates for high risk
pub const HIGH_RISK_ACTIONS: [&str; 7] = [
    "Reach out to a family member or caregiver",
    "Consider talking to a health professional",
    "Practice relaxation techniques right away",
    "Avoid spending long periods alone",
    "Keep a regular sleep routine",
    "Seek out activities that bring pleasure and well-being",
    "Consider joining a support group",
];

/// The fixed candidate pool for a risk level
pub fn candidates_for(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Low => &LOW_RISK_ACTIONS,
        RiskLevel::Moderate => &MODERATE_RISK_ACTIONS,
        RiskLevel::High => &HIGH_RISK_ACTIONS,
    }
}

/// Issues one recommendation per registered subject per tick.
pub struct RecommendationSelector {
    store: Arc<dyn HealthStore>,
    rng: Mutex<ChaCha8Rng>,
}

impl RecommendationSelector {
    /// Create a selector over a shared store with a fixed RNG seed
    pub fn new(store: Arc<dyn HealthStore>, seed: u64) -> Self {
        Self {
            store,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Uniform pick from the candidate pool for a level
    pub fn pick(rng: &mut impl Rng, level: RiskLevel) -> &'static str {
        let pool = candidates_for(level);
        pool[rng.gen_range(0..pool.len())]
    }

    /// Recommend an intervention for every subject in the registry snapshot
    pub async fn run_tick(&self) -> TickReport {
        let mut report = TickReport::new(SELECTOR_TASK);

        let subjects = match self.store.list_subjects().await {
            Ok(subjects) => subjects,
            Err(err) => {
                error!(task = SELECTOR_TASK, %err, "could not snapshot subject registry");
                return report;
            }
        };

        for subject in &subjects {
            let outcome = self.recommend_for_subject(subject.id, &subject.name).await;
            report.record(subject.id, outcome);
        }

        report
    }

    /// Resolve the current risk level and append one recommendation
    async fn recommend_for_subject(&self, subject_id: u64, name: &str) -> SubjectOutcome {
        let level = match self.store.latest_assessment(subject_id).await {
            Ok(assessment) => assessment
                .map(|a| a.risk_level)
                .unwrap_or(RiskLevel::Low),
            Err(err) => return SubjectOutcome::Failed(err.into()),
        };

        let text = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            Self::pick(&mut *rng, level)
        };

        match self
            .store
            .append_recommendation(
                subject_id,
                text.to_string(),
                level,
                AUTO_GENERATED_NOTE.to_string(),
            )
            .await
        {
            Ok(_) => {
                info!(subject = %name, risk = %level, recommendation = text, "recommendation issued");
                if level == RiskLevel::High {
                    warn!(subject = %name, "high risk: immediate intervention recommended");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_sizes() {
        assert_eq!(candidates_for(RiskLevel::Low).len(), 5);
        assert_eq!(candidates_for(RiskLevel::Moderate).len(), 7);
        assert_eq!(candidates_for(RiskLevel::High).len(), 7);
    }

    #[test]
    fn test_pick_stays_in_pool_for_all_levels() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for level in [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High] {
            for _ in 0..500 {
                let text = RecommendationSelector::pick(&mut rng, level);
                assert!(
                    candidates_for(level).contains(&text),
                    "pick {:?} escaped the {} pool",
                    text,
                    level
                );
            }
        }
    }

    #[test]
    fn test_pick_reaches_every_candidate() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(RecommendationSelector::pick(&mut rng, RiskLevel::High));
        }
        assert_eq!(seen.len(), HIGH_RISK_ACTIONS.len(), "uniform pick should cover the pool");
    }

    #[test]
    fn test_seeded_pick_is_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(
                RecommendationSelector::pick(&mut a, RiskLevel::Moderate),
                RecommendationSelector::pick(&mut b, RiskLevel::Moderate)
            );
        }
    }
}

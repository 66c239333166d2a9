//! Storage collaborator: subject registry plus append-only record history
//!
//! The store is constructed once at startup and injected into every task as
//! a shared handle; there is no global accessor. All three periodic tasks
//! read and write through it concurrently, so every call is atomic and
//! bounded. Records are create-only: nothing here updates or deletes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::types::{
    Assessment, Observation, ObservationDraft, Recommendation, RiskLevel, StoreError, Subject,
};

/// Storage contract consumed by the simulator, classifier and selector, and
/// read by the presentation layer.
///
/// Implementations must be safe for concurrent use from multiple tasks.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// All registered subjects, ascending by name (stable order)
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError>;

    /// Append one observation to a subject's history
    async fn append_observation(
        &self,
        subject_id: u64,
        draft: ObservationDraft,
    ) -> Result<Observation, StoreError>;

    /// Observations inside the trailing day window, most recent first.
    ///
    /// A window of N days covers today plus the N-1 prior days. Same-day
    /// records order by descending id (insertion recency). An unknown
    /// subject yields an empty window, not an error.
    async fn recent_observations(
        &self,
        subject_id: u64,
        window_days: i64,
    ) -> Result<Vec<Observation>, StoreError>;

    /// Append one risk assessment for a subject
    async fn append_assessment(
        &self,
        subject_id: u64,
        risk_level: RiskLevel,
        rationale: String,
    ) -> Result<Assessment, StoreError>;

    /// The most recently appended assessment, if any
    async fn latest_assessment(&self, subject_id: u64) -> Result<Option<Assessment>, StoreError>;

    /// Most recent assessments, newest first, at most `limit`
    async fn recent_assessments(
        &self,
        subject_id: u64,
        limit: usize,
    ) -> Result<Vec<Assessment>, StoreError>;

    /// Append one recommendation for a subject
    async fn append_recommendation(
        &self,
        subject_id: u64,
        text: String,
        risk_level: RiskLevel,
        notes: String,
    ) -> Result<Recommendation, StoreError>;

    /// Most recent recommendations, newest first, at most `limit`
    async fn recent_recommendations(
        &self,
        subject_id: u64,
        limit: usize,
    ) -> Result<Vec<Recommendation>, StoreError>;

    /// Release the handle. Idempotent; every other call fails afterwards.
    async fn close(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct StoreInner {
    closed: bool,
    next_id: u64,
    subjects: Vec<Subject>,
    observations: HashMap<u64, Vec<Observation>>,
    assessments: HashMap<u64, Vec<Assessment>>,
    recommendations: HashMap<u64, Vec<Recommendation>>,
}

impl StoreInner {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn ensure_subject(&self, subject_id: u64) -> Result<(), StoreError> {
        if self.subjects.iter().any(|s| s.id == subject_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownSubject(subject_id))
        }
    }

    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store. Development stand-in for a database-backed collaborator,
/// sharing its contract.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subject. Bootstrap-only: the periodic tasks never register.
    pub async fn register_subject(
        &self,
        name: impl Into<String>,
        age: u32,
        sex: char,
    ) -> Result<Subject, StoreError> {
        let mut inner = self.inner.write().await;
        inner.ensure_open()?;
        let id = inner.assign_id();
        let subject = Subject::new(id, name, age, sex);
        inner.subjects.push(subject.clone());
        // Registry order is stable: ascending by name, id as tiebreak.
        inner
            .subjects
            .sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(subject)
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn list_subjects(&self) -> Result<Vec<Subject>, StoreError> {
        let inner = self.inner.read().await;
        inner.ensure_open()?;
        Ok(inner.subjects.clone())
    }

    async fn append_observation(
        &self,
        subject_id: u64,
        draft: ObservationDraft,
    ) -> Result<Observation, StoreError> {
        let mut inner = self.inner.write().await;
        inner.ensure_open()?;
        inner.ensure_subject(subject_id)?;
        let id = inner.assign_id();
        let observation = Observation::from_draft(id, subject_id, draft);
        inner
            .observations
            .entry(subject_id)
            .or_default()
            .push(observation.clone());
        Ok(observation)
    }

    async fn recent_observations(
        &self,
        subject_id: u64,
        window_days: i64,
    ) -> Result<Vec<Observation>, StoreError> {
        let inner = self.inner.read().await;
        inner.ensure_open()?;
        let cutoff = Utc::now().date_naive() - Duration::days(window_days - 1);
        let mut window: Vec<Observation> = inner
            .observations
            .get(&subject_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|o| o.collected_on >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        window.sort_by(|a, b| {
            b.collected_on
                .cmp(&a.collected_on)
                .then(b.id.cmp(&a.id))
        });
        Ok(window)
    }

    async fn append_assessment(
        &self,
        subject_id: u64,
        risk_level: RiskLevel,
        rationale: String,
    ) -> Result<Assessment, StoreError> {
        let mut inner = self.inner.write().await;
        inner.ensure_open()?;
        inner.ensure_subject(subject_id)?;
        let id = inner.assign_id();
        let assessment = Assessment::new(id, subject_id, risk_level, rationale);
        inner
            .assessments
            .entry(subject_id)
            .or_default()
            .push(assessment.clone());
        Ok(assessment)
    }

    async fn latest_assessment(&self, subject_id: u64) -> Result<Option<Assessment>, StoreError> {
        let inner = self.inner.read().await;
        inner.ensure_open()?;
        Ok(inner
            .assessments
            .get(&subject_id)
            .and_then(|records| records.last().cloned()))
    }

    async fn recent_assessments(
        &self,
        subject_id: u64,
        limit: usize,
    ) -> Result<Vec<Assessment>, StoreError> {
        let inner = self.inner.read().await;
        inner.ensure_open()?;
        Ok(inner
            .assessments
            .get(&subject_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn append_recommendation(
        &self,
        subject_id: u64,
        text: String,
        risk_level: RiskLevel,
        notes: String,
    ) -> Result<Recommendation, StoreError> {
        let mut inner = self.inner.write().await;
        inner.ensure_open()?;
        inner.ensure_subject(subject_id)?;
        let id = inner.assign_id();
        let recommendation = Recommendation::new(id, subject_id, text, risk_level, notes);
        inner
            .recommendations
            .entry(subject_id)
            .or_default()
            .push(recommendation.clone());
        Ok(recommendation)
    }

    async fn recent_recommendations(
        &self,
        subject_id: u64,
        limit: usize,
    ) -> Result<Vec<Recommendation>, StoreError> {
        let inner = self.inner.read().await;
        inner.ensure_open()?;
        Ok(inner
            .recommendations
            .get(&subject_id)
            .map(|records| records.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.closed = true;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityLevel, Mood};
    use chrono::NaiveDate;

    fn draft_on(date: NaiveDate) -> ObservationDraft {
        ObservationDraft {
            collected_on: date,
            sleep_hours: 7.0,
            sleep_quality: 4,
            mood: Mood::Neutral,
            activity_level: ActivityLevel::Light,
            heart_rate: 70,
        }
    }

    #[tokio::test]
    async fn test_subjects_listed_by_name() {
        let store = MemoryStore::new();
        store.register_subject("Clara", 75, 'F').await.unwrap();
        store.register_subject("Arthur", 70, 'M').await.unwrap();
        store.register_subject("Bea", 68, 'F').await.unwrap();

        let names: Vec<String> = store
            .list_subjects()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Arthur", "Bea", "Clara"]);
    }

    #[tokio::test]
    async fn test_append_requires_registered_subject() {
        let store = MemoryStore::new();
        let today = Utc::now().date_naive();

        let err = store.append_observation(99, draft_on(today)).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownSubject(99));
    }

    #[tokio::test]
    async fn test_recent_observations_descending_with_id_tiebreak() {
        let store = MemoryStore::new();
        let subject = store.register_subject("Arthur", 70, 'M').await.unwrap();
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);

        let old = store.append_observation(subject.id, draft_on(yesterday)).await.unwrap();
        let first_today = store.append_observation(subject.id, draft_on(today)).await.unwrap();
        let second_today = store.append_observation(subject.id, draft_on(today)).await.unwrap();

        let window = store.recent_observations(subject.id, 3).await.unwrap();
        let ids: Vec<u64> = window.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second_today.id, first_today.id, old.id]);
    }

    #[tokio::test]
    async fn test_window_excludes_records_outside_day_range() {
        let store = MemoryStore::new();
        let subject = store.register_subject("Arthur", 70, 'M').await.unwrap();
        let today = Utc::now().date_naive();

        store
            .append_observation(subject.id, draft_on(today - Duration::days(5)))
            .await
            .unwrap();
        store.append_observation(subject.id, draft_on(today)).await.unwrap();

        let window = store.recent_observations(subject.id, 3).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].collected_on, today);
    }

    #[tokio::test]
    async fn test_unknown_subject_queries_are_empty() {
        let store = MemoryStore::new();
        assert!(store.recent_observations(42, 3).await.unwrap().is_empty());
        assert!(store.latest_assessment(42).await.unwrap().is_none());
        assert!(store.recent_recommendations(42, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_assessment_is_newest() {
        let store = MemoryStore::new();
        let subject = store.register_subject("Arthur", 70, 'M').await.unwrap();

        store
            .append_assessment(subject.id, RiskLevel::Low, "first".into())
            .await
            .unwrap();
        store
            .append_assessment(subject.id, RiskLevel::High, "second".into())
            .await
            .unwrap();

        let latest = store.latest_assessment(subject.id).await.unwrap().unwrap();
        assert_eq!(latest.risk_level, RiskLevel::High);
        assert_eq!(latest.rationale, "second");

        let recent = store.recent_assessments(subject.id, 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].rationale, "second");
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_operations() {
        let store = MemoryStore::new();
        let subject = store.register_subject("Arthur", 70, 'M').await.unwrap();

        store.close().await.unwrap();
        store.close().await.unwrap();

        assert_eq!(store.list_subjects().await.unwrap_err(), StoreError::Closed);
        let err = store
            .append_observation(subject.id, draft_on(Utc::now().date_naive()))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Closed);
    }
}

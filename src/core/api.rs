//! Read-only HTTP API over the store
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /subjects - Registered subjects
//! - GET /subjects/:id/observations?days=N - Recent observations
//! - GET /subjects/:id/observations/latest - Latest observation or placeholder
//! - GET /subjects/:id/assessments?limit=N - Recent assessments
//! - GET /subjects/:id/recommendations?limit=N - Recent recommendations
//! - GET /risk-summary - Risk distribution across subjects
//! - GET /tasks - Periodic task status

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::core::{HealthStore, TaskStatus};
use crate::types::{
    ActivityLevel, Assessment, Mood, Observation, Recommendation, RiskLevel, StoreError, Subject,
};

/// Default day window for the observation list endpoint
const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Default record limit for assessment/recommendation lists
const DEFAULT_LIMIT: usize = 10;

/// App state shared by all handlers
pub struct AppState {
    pub store: Arc<dyn HealthStore>,
    pub tasks: Vec<Arc<TaskStatus>>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub subjects_registered: usize,
}

/// Latest observation response; a placeholder is served when the subject has
/// no observation history yet
#[derive(Debug, Serialize)]
pub struct LatestObservationResponse {
    pub subject_id: u64,
    pub collected_on: Option<NaiveDate>,
    pub sleep_hours: f64,
    pub sleep_quality: i32,
    pub mood: Mood,
    pub activity_level: ActivityLevel,
    pub heart_rate: i32,
    pub placeholder: bool,
}

impl LatestObservationResponse {
    fn from_observation(observation: Observation) -> Self {
        Self {
            subject_id: observation.subject_id,
            collected_on: Some(observation.collected_on),
            sleep_hours: observation.sleep_hours,
            sleep_quality: observation.sleep_quality,
            mood: observation.mood,
            activity_level: observation.activity_level,
            heart_rate: observation.heart_rate,
            placeholder: false,
        }
    }

    /// Neutral defaults served when no observation exists yet
    fn placeholder(subject_id: u64) -> Self {
        Self {
            subject_id,
            collected_on: None,
            sleep_hours: 7.0,
            sleep_quality: 3,
            mood: Mood::Neutral,
            activity_level: ActivityLevel::Light,
            heart_rate: 75,
            placeholder: true,
        }
    }
}

/// Aggregate risk distribution over subjects' latest assessments
#[derive(Debug, Serialize)]
pub struct RiskSummaryResponse {
    pub subjects: usize,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
}

/// Status view of one periodic task
#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub name: String,
    pub active: bool,
    pub cadence: String,
    pub ticks_started: u64,
}

/// Day-window query parameter
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_window_days")]
    pub days: i64,
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

/// Record-limit query parameter
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Create the API router
pub fn create_router(store: Arc<dyn HealthStore>, tasks: Vec<Arc<TaskStatus>>) -> Router {
    let state = Arc::new(AppState { store, tasks });

    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects))
        .route("/subjects/:id/observations", get(recent_observations))
        .route("/subjects/:id/observations/latest", get(latest_observation))
        .route("/subjects/:id/assessments", get(recent_assessments))
        .route("/subjects/:id/recommendations", get(recent_recommendations))
        .route("/risk-summary", get(risk_summary))
        .route("/tasks", get(task_statuses))
        .with_state(state)
}

/// Map a store failure to an internal-error response
fn internal_error(err: StoreError) -> StatusCode {
    error!(%err, "store read failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, StatusCode> {
    let subjects = state.store.list_subjects().await.map_err(internal_error)?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        subjects_registered: subjects.len(),
    }))
}

/// Registered subjects
async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subject>>, StatusCode> {
    let subjects = state.store.list_subjects().await.map_err(internal_error)?;
    Ok(Json(subjects))
}

/// Recent observations for a subject, bounded by a day window.
/// Unknown or dataless subjects yield an empty list.
async fn recent_observations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Observation>>, StatusCode> {
    let observations = state
        .store
        .recent_observations(id, query.days)
        .await
        .map_err(internal_error)?;
    Ok(Json(observations))
}

/// Latest observation for a subject, or the fixed placeholder when none exists
async fn latest_observation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<LatestObservationResponse>, StatusCode> {
    let observations = state
        .store
        .recent_observations(id, DEFAULT_WINDOW_DAYS)
        .await
        .map_err(internal_error)?;

    let response = observations
        .into_iter()
        .next()
        .map(LatestObservationResponse::from_observation)
        .unwrap_or_else(|| LatestObservationResponse::placeholder(id));
    Ok(Json(response))
}

/// Recent assessments for a subject, newest first
async fn recent_assessments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Assessment>>, StatusCode> {
    let assessments = state
        .store
        .recent_assessments(id, query.limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(assessments))
}

/// Recent recommendations for a subject, newest first
async fn recent_recommendations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Recommendation>>, StatusCode> {
    let recommendations = state
        .store
        .recent_recommendations(id, query.limit)
        .await
        .map_err(internal_error)?;
    Ok(Json(recommendations))
}

/// Distribution of subjects over their latest assessed risk level.
/// Subjects without an assessment count as low, matching the selector.
async fn risk_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RiskSummaryResponse>, StatusCode> {
    let subjects = state.store.list_subjects().await.map_err(internal_error)?;

    let mut summary = RiskSummaryResponse {
        subjects: subjects.len(),
        low: 0,
        moderate: 0,
        high: 0,
    };
    for subject in &subjects {
        let level = state
            .store
            .latest_assessment(subject.id)
            .await
            .map_err(internal_error)?
            .map(|a| a.risk_level)
            .unwrap_or(RiskLevel::Low);
        match level {
            RiskLevel::Low => summary.low += 1,
            RiskLevel::Moderate => summary.moderate += 1,
            RiskLevel::High => summary.high += 1,
        }
    }
    Ok(Json(summary))
}

/// Status view of the periodic tasks
async fn task_statuses(State(state): State<Arc<AppState>>) -> Json<Vec<TaskStatusResponse>> {
    let statuses = state
        .tasks
        .iter()
        .map(|task| TaskStatusResponse {
            name: task.name.to_string(),
            active: task.is_active(),
            cadence: task.cadence.clone(),
            ticks_started: task.ticks_started(),
        })
        .collect();
    Json(statuses)
}

/// Run the API server until the shutdown future resolves
pub async fn run_server(
    addr: &str,
    router: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

//! Mindwatch: periodic emotional-risk monitoring pipeline
//!
//! Three independently scheduled tasks share one subject registry and store:
//! collector → observation history → classifier → assessments → selector

pub mod core;
pub mod types;

// =============================================================================
// RISK SCORING
// =============================================================================

/// Sleep below this many hours scores as insufficient
pub const SLEEP_HOURS_LOW: f64 = 6.0;

/// Sleep quality below this (1-5 scale) scores as poor
pub const SLEEP_QUALITY_LOW: i32 = 3;

/// Heart rate above this (bpm) scores as abnormal
pub const HEART_RATE_HIGH: i32 = 90;

/// Heart rate below this (bpm) scores as abnormal
pub const HEART_RATE_LOW: i32 = 60;

/// Points per triggered condition, in scoring order
pub const POINTS_INSUFFICIENT_SLEEP: i32 = 2;
pub const POINTS_POOR_SLEEP_QUALITY: i32 = 2;
pub const POINTS_NEGATIVE_MOOD: i32 = 3;
pub const POINTS_INSUFFICIENT_ACTIVITY: i32 = 2;
pub const POINTS_ABNORMAL_HEART_RATE: i32 = 1;

/// Score at or above this classifies as high risk
pub const SCORE_HIGH_RISK: i32 = 6;

/// Score at or above this (and below high) classifies as moderate risk
pub const SCORE_MODERATE_RISK: i32 = 3;

/// Leading run length that counts as a persistent trend
pub const TREND_MIN_RUN: usize = 2;

/// Trailing window of observation history the classifier reads (days)
pub const OBSERVATION_WINDOW_DAYS: i64 = 3;

// =============================================================================
// SIMULATED SIGNAL RANGES
// =============================================================================

/// Simulated sleep: 5.0 + U(0, 4.0) hours → [5.0, 9.0)
pub const SIM_SLEEP_HOURS_MIN: f64 = 5.0;
pub const SIM_SLEEP_HOURS_SPAN: f64 = 4.0;

/// Sleep quality at or above this counts as restful for mood purposes
pub const SIM_GOOD_SLEEP_QUALITY: i32 = 4;

/// Sleep quality at or below this counts as poor for mood purposes
pub const SIM_POOR_SLEEP_QUALITY: i32 = 2;

/// Hours of sleep at or above which a subject may wake up positive
pub const SIM_RESTED_HOURS: f64 = 7.0;

/// Resting heart-rate base: 65 + U_int(0, 19) bpm
pub const SIM_HEART_RATE_BASE: i32 = 65;

/// Generated heart rate is clamped to this range
pub const HEART_RATE_CLAMP_MIN: i32 = 50;
pub const HEART_RATE_CLAMP_MAX: i32 = 120;

// =============================================================================
// DEFAULT CADENCES
// =============================================================================

/// Observation collector: first tick after 1s, then every 10s
pub const COLLECT_INITIAL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_COLLECT_INTERVAL_SECS: u64 = 10;

/// Risk classifier: first tick after 5s, then every 15s
pub const ASSESS_INITIAL_DELAY_MS: u64 = 5_000;
pub const DEFAULT_ASSESS_INTERVAL_SECS: u64 = 15;

/// Recommendation selector: first tick after 8s, then every 20s
pub const RECOMMEND_INITIAL_DELAY_MS: u64 = 8_000;
pub const DEFAULT_RECOMMEND_INTERVAL_SECS: u64 = 20;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";

//! Core modules for Mindwatch

pub mod api;
pub mod classifier;
pub mod scheduler;
pub mod selector;
pub mod simulator;
pub mod store;

pub use api::{create_router, run_server};
pub use classifier::{score_window, RiskClassifier, RiskScore};
pub use scheduler::{Scheduler, TaskSpec, TaskStatus};
pub use selector::{candidates_for, RecommendationSelector};
pub use simulator::ObservationSimulator;
pub use store::{HealthStore, MemoryStore};

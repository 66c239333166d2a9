//! Registered subject model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered person being monitored. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique, stable identifier
    pub id: u64,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Sex marker ('M' / 'F')
    pub sex: char,
    /// When the subject was registered
    pub registered_at: DateTime<Utc>,
}

impl Subject {
    /// Create a new subject record
    pub fn new(id: u64, name: impl Into<String>, age: u32, sex: char) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            sex,
            registered_at: Utc::now(),
        }
    }
}

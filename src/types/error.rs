//! Error taxonomy for the monitoring pipeline
//!
//! Storage and data errors are isolated per subject within a tick; only a
//! configuration error at startup is fatal.

use thiserror::Error;

/// Failure on a storage collaborator call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// I/O or connectivity failure
    #[error("storage i/o failure: {0}")]
    Io(String),
    /// Appending a record for a subject not present in the registry
    #[error("unknown subject id {0}")]
    UnknownSubject(u64),
    /// The store handle has been closed
    #[error("store is closed")]
    Closed,
}

/// Pipeline-level error taxonomy
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Storage failure; the current subject aborts, the tick continues
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// Missing or malformed fields on a read observation
    #[error("malformed observation data: {0}")]
    Data(String),
    /// Invalid scheduling parameters at startup; fatal for the task
    #[error("invalid task configuration: {0}")]
    Config(String),
}

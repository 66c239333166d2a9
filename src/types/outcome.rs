//! Per-subject tick outcomes
//!
//! Each periodic task processes every subject once per tick. The outcome of
//! each subject is recorded explicitly so the tick driver can log failures
//! without ever aborting the remaining subjects.

use tracing::{error, warn};

use crate::types::MonitorError;

/// Why a subject was skipped in a tick (not an error)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No observations inside the trailing window yet
    EmptyWindow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyWindow => write!(f, "no observations in window"),
        }
    }
}

/// Outcome of processing one subject within one tick
#[derive(Debug)]
pub enum SubjectOutcome {
    /// A record was appended for the subject
    Processed,
    /// The subject was skipped; the tick continues
    Skipped(SkipReason),
    /// Processing failed; logged, the tick continues with the next subject
    Failed(MonitorError),
}

/// Aggregated outcomes of one tick of one periodic task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Task the tick belongs to
    pub task: &'static str,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl TickReport {
    /// Create an empty report for a task
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            processed: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Record one subject's outcome, logging skips and failures
    pub fn record(&mut self, subject_id: u64, outcome: SubjectOutcome) {
        match outcome {
            SubjectOutcome::Processed => self.processed += 1,
            SubjectOutcome::Skipped(reason) => {
                self.skipped += 1;
                warn!(task = self.task, subject_id, %reason, "subject skipped");
            }
            SubjectOutcome::Failed(err) => {
                self.failed += 1;
                error!(task = self.task, subject_id, %err, "subject processing failed");
            }
        }
    }

    /// Total subjects seen by the tick
    pub fn subjects(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed={} skipped={} failed={}",
            self.processed, self.skipped, self.failed
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoreError;

    #[test]
    fn test_report_counts_outcomes() {
        let mut report = TickReport::new("test-task");
        report.record(1, SubjectOutcome::Processed);
        report.record(2, SubjectOutcome::Skipped(SkipReason::EmptyWindow));
        report.record(3, SubjectOutcome::Failed(StoreError::Io("boom".into()).into()));
        report.record(4, SubjectOutcome::Processed);

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.subjects(), 4);
    }

    #[test]
    fn test_report_display() {
        let mut report = TickReport::new("test-task");
        report.record(1, SubjectOutcome::Processed);
        assert_eq!(report.to_string(), "processed=1 skipped=0 failed=0");
    }
}

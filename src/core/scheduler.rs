//! Periodic task scheduler
//!
//! Each task is (initial delay, interval, unit of work). Ticks fire on
//! schedule regardless of whether the previous tick finished: the unit of
//! work runs on its own spawned task, so overlapping invocations of the same
//! task are possible and tolerated. Processing is append-only, so overlap
//! produces at most duplicate records, never corrupted state.
//!
//! Shutdown stops issuing new ticks and waits for in-flight ticks to finish;
//! no work is cancelled mid-subject.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::types::{MonitorError, TickReport};

/// Configuration for one periodic task
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// Stable task name, used in logs and the status view
    pub name: &'static str,
    /// Delay before the first tick
    pub initial_delay: Duration,
    /// Repeat interval between tick starts
    pub interval: Duration,
}

impl TaskSpec {
    /// Create a task spec
    pub fn new(name: &'static str, initial_delay: Duration, interval: Duration) -> Self {
        Self {
            name,
            initial_delay,
            interval,
        }
    }

    /// Reject unusable scheduling parameters. Fatal at startup.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.interval.is_zero() {
            return Err(MonitorError::Config(format!(
                "task {}: interval must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Human-readable cadence description
    pub fn cadence(&self) -> String {
        format!(
            "every {:?} (first tick after {:?})",
            self.interval, self.initial_delay
        )
    }
}

/// Live status of a scheduled task, shared with the presentation layer
#[derive(Debug)]
pub struct TaskStatus {
    /// Task name from the spec
    pub name: &'static str,
    /// Cadence description from the spec
    pub cadence: String,
    active: AtomicBool,
    ticks_started: AtomicU64,
}

impl TaskStatus {
    fn new(spec: &TaskSpec) -> Self {
        Self {
            name: spec.name,
            cadence: spec.cadence(),
            active: AtomicBool::new(true),
            ticks_started: AtomicU64::new(0),
        }
    }

    /// Is the task still issuing ticks?
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of ticks started so far
    pub fn ticks_started(&self) -> u64 {
        self.ticks_started.load(Ordering::SeqCst)
    }

    fn tick_started(&self) {
        self.ticks_started.fetch_add(1, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

struct ScheduledTask {
    status: Arc<TaskStatus>,
    handle: JoinHandle<()>,
}

/// Owns the periodic tasks and their shutdown signal.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    tasks: Vec<ScheduledTask>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a scheduler with no tasks
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            tasks: Vec::new(),
        }
    }

    /// Spawn a periodic task. `work` is invoked once per tick; each
    /// invocation runs on its own tokio task so a slow tick never delays
    /// the next one.
    pub fn spawn<F, Fut>(&mut self, spec: TaskSpec, work: F) -> Result<Arc<TaskStatus>, MonitorError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TickReport> + Send + 'static,
    {
        spec.validate()?;

        let status = Arc::new(TaskStatus::new(&spec));
        let task_status = status.clone();
        let mut shutdown = self.shutdown.subscribe();

        info!(task = spec.name, cadence = %spec.cadence(), "scheduling periodic task");

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + spec.initial_delay;
            let mut ticker = tokio::time::interval_at(start, spec.interval);
            let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        task_status.tick_started();
                        in_flight.retain(|h| !h.is_finished());
                        let name = spec.name;
                        let tick = work();
                        in_flight.push(tokio::spawn(async move {
                            let report = tick.await;
                            debug!(task = name, %report, "tick finished");
                        }));
                    }
                    _ = shutdown.changed() => break,
                }
            }

            task_status.deactivate();
            // Stop issuing ticks but let in-flight work run to completion.
            join_all(in_flight).await;
            info!(task = spec.name, "periodic task stopped");
        });

        self.tasks.push(ScheduledTask {
            status: status.clone(),
            handle,
        });
        Ok(status)
    }

    /// Status handles for every scheduled task
    pub fn statuses(&self) -> Vec<Arc<TaskStatus>> {
        self.tasks.iter().map(|t| t.status.clone()).collect()
    }

    /// Stop issuing ticks and wait for every task to drain its in-flight work
    pub async fn shutdown(self) {
        let Scheduler { shutdown, tasks } = self;
        let _ = shutdown.send(true);
        join_all(tasks.into_iter().map(|t| t.handle)).await;
        info!("scheduler stopped");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_interval_is_a_config_error() {
        let spec = TaskSpec::new("broken", Duration::from_millis(0), Duration::from_millis(0));
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn test_cadence_description() {
        let spec = TaskSpec::new("collector", Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(spec.cadence(), "every 10s (first tick after 1s)");
    }
}

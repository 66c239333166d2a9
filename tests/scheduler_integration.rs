//! Integration tests for the periodic task scheduler
//!
//! Uses short real intervals; assertions leave generous margins so the tests
//! stay stable on loaded machines.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mindwatch::core::{Scheduler, TaskSpec};
use mindwatch::types::{MonitorError, TickReport};
use tokio::time::sleep;

#[tokio::test]
async fn test_ticks_fire_on_cadence() {
    let mut scheduler = Scheduler::new();
    let count = Arc::new(AtomicU64::new(0));

    let counter = count.clone();
    scheduler
        .spawn(
            TaskSpec::new("ticker", Duration::from_millis(10), Duration::from_millis(25)),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    TickReport::new("ticker")
                }
            },
        )
        .unwrap();

    sleep(Duration::from_millis(150)).await;
    scheduler.shutdown().await;

    let ticks = count.load(Ordering::SeqCst);
    assert!(ticks >= 3, "expected at least 3 ticks, got {}", ticks);
}

#[tokio::test]
async fn test_initial_delay_holds_back_first_tick() {
    let mut scheduler = Scheduler::new();
    let count = Arc::new(AtomicU64::new(0));

    let counter = count.clone();
    scheduler
        .spawn(
            TaskSpec::new("delayed", Duration::from_millis(300), Duration::from_millis(10)),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    TickReport::new("delayed")
                }
            },
        )
        .unwrap();

    sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0, "no tick before the initial delay");
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_slow_ticks_overlap_instead_of_blocking() {
    let mut scheduler = Scheduler::new();
    let active = Arc::new(AtomicU64::new(0));
    let peak = Arc::new(AtomicU64::new(0));

    let active_gauge = active.clone();
    let peak_gauge = peak.clone();
    scheduler
        .spawn(
            TaskSpec::new("slow", Duration::from_millis(5), Duration::from_millis(20)),
            move || {
                let active = active_gauge.clone();
                let peak = peak_gauge.clone();
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    // Deliberately slower than the interval.
                    sleep(Duration::from_millis(80)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    TickReport::new("slow")
                }
            },
        )
        .unwrap();

    sleep(Duration::from_millis(200)).await;
    scheduler.shutdown().await;

    assert!(
        peak.load(Ordering::SeqCst) >= 2,
        "a slow tick must not block the next tick from starting"
    );
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_tick() {
    let mut scheduler = Scheduler::new();
    let finished = Arc::new(AtomicBool::new(false));

    let flag = finished.clone();
    scheduler
        .spawn(
            TaskSpec::new("draining", Duration::from_millis(5), Duration::from_millis(500)),
            move || {
                let flag = flag.clone();
                async move {
                    sleep(Duration::from_millis(100)).await;
                    flag.store(true, Ordering::SeqCst);
                    TickReport::new("draining")
                }
            },
        )
        .unwrap();

    // Let the first tick start, then shut down while it is still running.
    sleep(Duration::from_millis(30)).await;
    scheduler.shutdown().await;

    assert!(
        finished.load(Ordering::SeqCst),
        "shutdown must let the in-flight tick run to completion"
    );
}

#[tokio::test]
async fn test_status_reflects_lifecycle() {
    let mut scheduler = Scheduler::new();
    let status = scheduler
        .spawn(
            TaskSpec::new("status", Duration::from_millis(5), Duration::from_millis(20)),
            || async { TickReport::new("status") },
        )
        .unwrap();

    assert!(status.is_active());
    assert_eq!(status.cadence, "every 20ms (first tick after 5ms)");

    sleep(Duration::from_millis(60)).await;
    assert!(status.ticks_started() >= 1);

    scheduler.shutdown().await;
    assert!(!status.is_active(), "status deactivates on shutdown");
}

#[tokio::test]
async fn test_zero_interval_is_fatal_for_the_task() {
    let mut scheduler = Scheduler::new();
    let result = scheduler.spawn(TaskSpec::new("broken", Duration::ZERO, Duration::ZERO), || async {
        TickReport::new("broken")
    });

    assert!(matches!(result, Err(MonitorError::Config(_))));
    assert!(scheduler.statuses().is_empty(), "a rejected task is never scheduled");
    scheduler.shutdown().await;
}

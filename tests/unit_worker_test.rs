use ids2_agent::core::workers::{RestartDecision, WorkerHandle};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_handle_start_and_liveness() {
    let launches = Arc::new(AtomicU32::new(0));
    let launches_clone = launches.clone();
    let mut handle = WorkerHandle::new("test-worker", Duration::from_secs(1), move || {
        launches_clone.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        })
    });

    assert!(!handle.alive());
    handle.start();
    assert!(handle.alive());
    assert_eq!(launches.load(Ordering::SeqCst), 1);

    handle.start();
    assert_eq!(launches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_handle_detects_finished_task() {
    let mut handle = WorkerHandle::new("short-lived", Duration::from_secs(1), || {
        tokio::spawn(async {})
    });
    handle.start();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.alive());
}

#[tokio::test]
async fn test_stop_aborts_past_deadline() {
    let mut handle = WorkerHandle::new("stubborn", Duration::from_millis(50), || {
        tokio::spawn(async {
            // Ignores shutdown entirely.
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        })
    });
    handle.start();
    let started = std::time::Instant::now();
    handle.stop().await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!handle.alive());
}

#[tokio::test]
async fn test_crash_loop_abandons_after_three_strikes() {
    let mut handle = WorkerHandle::new("crashy", Duration::from_secs(1), || {
        tokio::spawn(async {})
    });
    assert_eq!(handle.record_crash(), RestartDecision::Restart);
    assert_eq!(handle.record_crash(), RestartDecision::Restart);
    assert_eq!(handle.record_crash(), RestartDecision::Abandon);
    assert!(handle.abandoned());
}

#[tokio::test]
async fn test_stop_without_start_is_a_noop() {
    let mut handle = WorkerHandle::new("never-started", Duration::from_millis(10), || {
        tokio::spawn(async {})
    });
    handle.stop().await;
    assert!(!handle.alive());
}

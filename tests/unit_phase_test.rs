use ids2_agent::agent::phases::{apply_service_flag, wait_for_connectivity};
use ids2_agent::agent::Phase;
use ids2_agent::core::state::{ConnectivitySnapshot, PipelineStatus, SharedState};
use ids2_agent::core::AgentError;
use std::time::Duration;
use tokio::sync::broadcast;

#[test]
fn test_phase_order_is_strictly_increasing() {
    let sequence = [
        Phase::RemoteVerification,
        Phase::ConfigGeneration,
        Phase::StackBringUp,
        Phase::ConnectivityWait,
        Phase::PipelineVerification,
        Phase::Snapshot,
        Phase::Monitoring,
    ];
    for pair in sequence.windows(2) {
        assert!(pair[0] < pair[1], "{:?} should precede {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_phase_labels_are_distinct() {
    let labels = [
        Phase::RemoteVerification.label(),
        Phase::ConfigGeneration.label(),
        Phase::StackBringUp.label(),
        Phase::ConnectivityWait.label(),
        Phase::PipelineVerification.label(),
        Phase::Snapshot.label(),
        Phase::Monitoring.label(),
    ];
    for (i, a) in labels.iter().enumerate() {
        for b in &labels[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_service_flag_mapping() {
    let mut status = PipelineStatus::default();
    apply_service_flag(&mut status, "vector", true);
    apply_service_flag(&mut status, "suricata", true);
    apply_service_flag(&mut status, "redis", false);
    apply_service_flag(&mut status, "grafana", true); // untracked, ignored
    assert!(status.vector_running);
    assert!(status.suricata_running);
    assert!(!status.redis_running);
}

#[tokio::test]
async fn test_connectivity_wait_succeeds_when_ready() {
    let state = SharedState::new(None);
    state.publish_connectivity(ConnectivitySnapshot::new(true, true, true, 1));
    let (tx, _) = broadcast::channel(1);
    wait_for_connectivity(
        &state,
        tx.subscribe(),
        Duration::from_secs(120),
        Duration::from_secs(10),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_connectivity_wait_times_out() {
    let state = SharedState::new(None);
    state.publish_connectivity(ConnectivitySnapshot::new(true, true, false, 1));
    let (tx, _) = broadcast::channel(1);
    let err = wait_for_connectivity(
        &state,
        tx.subscribe(),
        Duration::ZERO,
        Duration::from_millis(10),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AgentError::RemoteUnavailable(_)));
}

#[tokio::test]
async fn test_connectivity_wait_cancelled_by_shutdown() {
    let state = SharedState::new(None);
    let (tx, _) = broadcast::channel(1);
    let rx = tx.subscribe();
    let waiter = tokio::spawn(async move {
        wait_for_connectivity(&state, rx, Duration::from_secs(120), Duration::from_secs(10)).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

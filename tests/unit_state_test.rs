use ids2_agent::config::ResourceConfig;
use ids2_agent::core::state::{
    ConnectivitySnapshot, ResourceSample, SharedState, ThrottleLevel,
};

#[test]
fn test_snapshot_exposes_well_known_keys() {
    let state = SharedState::new(Some("https://demo.cluster.example:443".to_string()));
    let snapshot = serde_json::to_value(state.snapshot()).unwrap();
    let object = snapshot.as_object().unwrap();

    for key in [
        "cpu_percent",
        "ram_percent",
        "throttle_level",
        "resource_ok",
        "last_reclaim_time",
        "dns_ok",
        "tls_ok",
        "opensearch_ok",
        "aws_ready",
        "last_connectivity_check",
        "opensearch_endpoint",
        "vector_running",
        "suricata_running",
        "redis_running",
        "api_running",
        "pipeline_ok",
        "events_processed",
        "events_failed",
    ] {
        assert!(object.contains_key(key), "snapshot is missing '{key}'");
    }
    assert_eq!(
        object["opensearch_endpoint"],
        serde_json::json!("https://demo.cluster.example:443")
    );
}

#[test]
fn test_aws_ready_is_conjunction_of_probes() {
    for dns in [false, true] {
        for tls in [false, true] {
            for bulk in [false, true] {
                let snapshot = ConnectivitySnapshot::new(dns, tls, bulk, 1_000);
                assert_eq!(snapshot.aws_ready, dns && tls && bulk);
            }
        }
    }
}

#[test]
fn test_publish_connectivity_roundtrip() {
    let state = SharedState::new(None);
    assert!(!state.aws_ready());
    state.publish_connectivity(ConnectivitySnapshot::new(true, true, true, 42));
    assert!(state.aws_ready());
    let connectivity = state.connectivity();
    assert_eq!(connectivity.last_check, Some(42));
}

#[test]
fn test_counters_are_monotonic() {
    let state = SharedState::new(None);
    assert_eq!(state.counters.processed(), 0);
    state.counters.add_processed(3);
    state.counters.add_processed(2);
    state.counters.add_failed(1);
    assert_eq!(state.counters.processed(), 5);
    assert_eq!(state.counters.failed(), 1);
}

#[test]
fn test_pipeline_section_updates() {
    let state = SharedState::new(None);
    state.update_pipeline(|status| {
        status.vector_running = true;
        status.pipeline_ok = true;
    });
    let pipeline = state.pipeline();
    assert!(pipeline.vector_running);
    assert!(pipeline.pipeline_ok);
    assert!(!pipeline.redis_running);
}

#[test]
fn test_resource_sample_respects_ceilings() {
    let limits = ResourceConfig::default();
    let ok = ResourceSample::from_usage(20.0, 30.0, &limits);
    assert!(ok.resource_ok);
    assert_eq!(ok.throttle_level, ThrottleLevel::None);

    let over = ResourceSample::from_usage(75.0, 30.0, &limits);
    assert!(!over.resource_ok);
    assert_eq!(over.throttle_level, ThrottleLevel::Heavy);
}

#[test]
fn test_endpoint_overwrite() {
    let state = SharedState::new(Some("https://old.example".to_string()));
    state.set_endpoint("https://new.example".to_string());
    assert_eq!(state.endpoint().as_deref(), Some("https://new.example"));
}

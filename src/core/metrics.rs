// src/core/metrics.rs

//! Defines and registers Prometheus metrics for the agent.
//!
//! This module uses `lazy_static` to ensure that metrics are registered only once
//! globally for the entire application lifecycle. The `ids2_` metric names are
//! part of the external scrape contract.

use crate::core::state::SharedState;
use lazy_static::lazy_static;
use prometheus::{
    Gauge, Histogram, IntCounter, IntCounterVec, IntGaugeVec, TextEncoder, histogram_opts,
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec,
};

lazy_static! {
    // --- System gauges ---
    /// The CPU usage sample from the resource governor.
    pub static ref CPU_USAGE_PERCENT: Gauge =
        register_gauge!("ids2_cpu_usage_percent", "Current CPU usage percentage.").unwrap();
    /// The RAM usage sample from the resource governor.
    pub static ref RAM_USAGE_PERCENT: Gauge =
        register_gauge!("ids2_ram_usage_percent", "Current RAM usage percentage.").unwrap();
    /// The current throttling level (0-3).
    pub static ref THROTTLE_LEVEL: Gauge =
        register_gauge!("ids2_throttle_level", "Current throttling level (0-3).").unwrap();

    // --- Connectivity gauges ---
    pub static ref DNS_STATUS: Gauge =
        register_gauge!("ids2_dns_status", "DNS connectivity status (1=ok, 0=fail).").unwrap();
    pub static ref TLS_STATUS: Gauge =
        register_gauge!("ids2_tls_status", "TLS connectivity status (1=ok, 0=fail).").unwrap();
    pub static ref OPENSEARCH_STATUS: Gauge =
        register_gauge!("ids2_opensearch_status", "OpenSearch bulk connectivity status (1=ok, 0=fail).").unwrap();
    pub static ref AWS_READY: Gauge =
        register_gauge!("ids2_aws_ready", "Remote cluster overall readiness (1=ready, 0=not ready).").unwrap();

    // --- Pipeline gauges ---
    pub static ref VECTOR_STATUS: Gauge =
        register_gauge!("ids2_vector_status", "Log shipper status (1=running, 0=stopped).").unwrap();
    pub static ref SURICATA_STATUS: Gauge =
        register_gauge!("ids2_suricata_status", "Packet inspector status (1=running, 0=stopped).").unwrap();
    pub static ref REDIS_STATUS: Gauge =
        register_gauge!("ids2_redis_status", "Side-buffer store status (1=running, 0=stopped).").unwrap();
    pub static ref PIPELINE_OK: Gauge =
        register_gauge!("ids2_pipeline_ok", "Overall pipeline health (1=ok, 0=degraded).").unwrap();

    // --- Counters ---
    /// Total events processed. Exported by delta from the shared-state counter
    /// so it stays monotonic across scrape refreshes.
    pub static ref EVENTS_PROCESSED_TOTAL: IntCounter =
        register_int_counter!("ids2_events_processed_total", "Total number of events processed.").unwrap();
    pub static ref EVENTS_FAILED_TOTAL: IntCounter =
        register_int_counter!("ids2_events_failed_total", "Total number of events that failed processing.").unwrap();
    /// Incremented directly by the resource governor on each forced reclaim.
    pub static ref GC_FORCED_TOTAL: IntCounter =
        register_int_counter!("ids2_gc_forced_total", "Total number of forced memory reclaims.").unwrap();
    /// Worker restart and abandonment events, labeled by worker name.
    pub static ref WORKER_RESTARTS_TOTAL: IntCounterVec =
        register_int_counter_vec!("ids2_worker_restarts_total", "Total number of worker restarts.", &["worker"]).unwrap();

    // --- Histograms ---
    /// Latency of probe-document ingestion into the remote cluster.
    pub static ref INGESTION_LATENCY_SECONDS: Histogram =
        register_histogram!(histogram_opts!(
            "ids2_ingestion_latency_seconds",
            "Latency of event ingestion to the remote cluster.",
            vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]
        )).unwrap();

    // --- Info ---
    /// Build information, exposed as a constant-1 gauge with identifying labels.
    pub static ref BUILD_INFO: IntGaugeVec =
        register_int_gauge_vec!("ids2_build", "Build information.", &["version", "platform", "architecture"]).unwrap();
}

/// Sets the build-info labels once at exporter startup.
pub fn set_build_info() {
    BUILD_INFO
        .with_label_values(&[
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH,
        ])
        .set(1);
}

lazy_static! {
    /// Serializes counter-delta exports: the scrape handler and the periodic
    /// refresher may run concurrently.
    static ref SYNC_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
}

fn bool_gauge(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Mirrors the shared-state snapshot into the registered gauges and counters.
/// Counters advance by delta so they never move backwards.
pub fn sync_shared_state(state: &SharedState) {
    let _guard = SYNC_LOCK.lock();
    let snapshot = state.snapshot();

    CPU_USAGE_PERCENT.set(snapshot.cpu_percent);
    RAM_USAGE_PERCENT.set(snapshot.ram_percent);
    THROTTLE_LEVEL.set(f64::from(snapshot.throttle_level));

    DNS_STATUS.set(bool_gauge(snapshot.dns_ok));
    TLS_STATUS.set(bool_gauge(snapshot.tls_ok));
    OPENSEARCH_STATUS.set(bool_gauge(snapshot.opensearch_ok));
    AWS_READY.set(bool_gauge(snapshot.aws_ready));

    VECTOR_STATUS.set(bool_gauge(snapshot.vector_running));
    SURICATA_STATUS.set(bool_gauge(snapshot.suricata_running));
    REDIS_STATUS.set(bool_gauge(snapshot.redis_running));
    PIPELINE_OK.set(bool_gauge(snapshot.pipeline_ok));

    let processed = snapshot.events_processed;
    let exported = EVENTS_PROCESSED_TOTAL.get();
    if processed > exported {
        EVENTS_PROCESSED_TOTAL.inc_by(processed - exported);
    }
    let failed = snapshot.events_failed;
    let exported = EVENTS_FAILED_TOTAL.get();
    if failed > exported {
        EVENTS_FAILED_TOTAL.inc_by(failed - exported);
    }
}

/// Gathers all registered metrics and encodes them in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}

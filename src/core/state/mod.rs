// src/core/state/mod.rs

//! The typed shared-state bus through which workers communicate.
//!
//! Each section has exactly one writer (resource governor, connectivity
//! prober, or supervisor); the event counters are the one multi-writer
//! section and use atomics. Readers tolerate stale values — sections are
//! updated independently and there is no cross-section atomic update.

mod connectivity;
mod counters;
mod pipeline;
mod resources;

pub use connectivity::ConnectivitySnapshot;
pub use counters::EventCounters;
pub use pipeline::PipelineStatus;
pub use resources::{ResourceSample, ThrottleAdvisory, ThrottleLevel};

use parking_lot::RwLock;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current time as unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The process-wide shared state. Wrapped in an `Arc` and handed to every
/// worker's constructor; locks are held only for copies, never across awaits.
#[derive(Debug, Default)]
pub struct SharedState {
    resources: RwLock<ResourceSample>,
    connectivity: RwLock<ConnectivitySnapshot>,
    pipeline: RwLock<PipelineStatus>,
    endpoint: RwLock<Option<String>>,
    pub counters: EventCounters,
}

impl SharedState {
    /// Creates the bus, seeding the endpoint from the configuration so the
    /// prober has something to probe before remote discovery completes.
    pub fn new(initial_endpoint: Option<String>) -> Self {
        Self {
            endpoint: RwLock::new(initial_endpoint),
            ..Default::default()
        }
    }

    // --- Resource governor section ---

    pub fn publish_resources(&self, sample: ResourceSample) {
        *self.resources.write() = sample;
    }

    pub fn resources(&self) -> ResourceSample {
        *self.resources.read()
    }

    pub fn record_reclaim(&self, at: u64) {
        self.resources.write().last_reclaim_time = Some(at);
    }

    pub fn last_reclaim_time(&self) -> Option<u64> {
        self.resources.read().last_reclaim_time
    }

    // --- Connectivity prober section ---

    pub fn publish_connectivity(&self, snapshot: ConnectivitySnapshot) {
        *self.connectivity.write() = snapshot;
    }

    pub fn connectivity(&self) -> ConnectivitySnapshot {
        *self.connectivity.read()
    }

    pub fn aws_ready(&self) -> bool {
        self.connectivity.read().aws_ready
    }

    // --- Supervisor section ---

    pub fn update_pipeline(&self, update: impl FnOnce(&mut PipelineStatus)) {
        update(&mut self.pipeline.write());
    }

    pub fn pipeline(&self) -> PipelineStatus {
        *self.pipeline.read()
    }

    pub fn set_endpoint(&self, endpoint: String) {
        *self.endpoint.write() = Some(endpoint);
    }

    pub fn endpoint(&self) -> Option<String> {
        self.endpoint.read().clone()
    }

    /// A consistent-per-key flat view, serialized by the control API and
    /// mirrored into the telemetry gauges.
    pub fn snapshot(&self) -> StateSnapshot {
        let resources = self.resources();
        let connectivity = self.connectivity();
        let pipeline = self.pipeline();
        StateSnapshot {
            cpu_percent: resources.cpu_percent,
            ram_percent: resources.ram_percent,
            throttle_level: resources.throttle_level.as_u8(),
            resource_ok: resources.resource_ok,
            last_reclaim_time: resources.last_reclaim_time,
            dns_ok: connectivity.dns_ok,
            tls_ok: connectivity.tls_ok,
            opensearch_ok: connectivity.opensearch_ok,
            aws_ready: connectivity.aws_ready,
            last_connectivity_check: connectivity.last_check,
            opensearch_endpoint: self.endpoint(),
            vector_running: pipeline.vector_running,
            suricata_running: pipeline.suricata_running,
            redis_running: pipeline.redis_running,
            api_running: pipeline.api_running,
            pipeline_ok: pipeline.pipeline_ok,
            events_processed: self.counters.processed(),
            events_failed: self.counters.failed(),
        }
    }
}

/// The flat shared-state view with its well-known key names. This shape is
/// the `/api/status` response body.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub throttle_level: u8,
    pub resource_ok: bool,
    pub last_reclaim_time: Option<u64>,
    pub dns_ok: bool,
    pub tls_ok: bool,
    pub opensearch_ok: bool,
    pub aws_ready: bool,
    pub last_connectivity_check: Option<u64>,
    pub opensearch_endpoint: Option<String>,
    pub vector_running: bool,
    pub suricata_running: bool,
    pub redis_running: bool,
    pub api_running: bool,
    pub pipeline_ok: bool,
    pub events_processed: u64,
    pub events_failed: u64,
}

// src/core/workers/governor.rs

//! The resource governor: samples host pressure, publishes the throttle
//! advisory, and forces memory reclaim under RAM pressure.

use crate::config::ResourceConfig;
use crate::core::metrics;
use crate::core::state::{unix_now, ResourceSample, SharedState, ThrottleLevel};
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::System;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// The CPU sample is averaged over this window, preceding each publish.
const SAMPLE_WINDOW: Duration = Duration::from_secs(1);
/// Idle time after each publish; total loop cadence is window + idle = 2 s.
const IDLE_INTERVAL: Duration = Duration::from_secs(1);
/// RAM percentage above which a reclaim is considered.
const RECLAIM_RAM_PERCENT: f64 = 65.0;
/// Minimum spacing between forced reclaims.
const RECLAIM_COOLDOWN: Duration = Duration::from_secs(30);

pub struct ResourceGovernor {
    limits: ResourceConfig,
    reclaim_enabled: bool,
    state: Arc<SharedState>,
}

impl ResourceGovernor {
    pub fn new(limits: ResourceConfig, reclaim_enabled: bool, state: Arc<SharedState>) -> Self {
        Self {
            limits,
            reclaim_enabled,
            state,
        }
    }

    /// The main sampling loop.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("Resource governor started");
        let mut sys = System::new();
        let mut last_reclaim: Option<Instant> = None;

        loop {
            sys.refresh_cpu_usage();
            tokio::select! {
                _ = tokio::time::sleep(SAMPLE_WINDOW) => {}
                _ = shutdown_rx.recv() => break,
            }
            sys.refresh_cpu_usage();
            sys.refresh_memory();

            let cpu = f64::from(sys.global_cpu_usage());
            let ram = if sys.total_memory() == 0 {
                0.0
            } else {
                sys.used_memory() as f64 / sys.total_memory() as f64 * 100.0
            };

            let mut sample = ResourceSample::from_usage(cpu, ram, &self.limits);
            sample.last_reclaim_time = self.state.last_reclaim_time();
            let level = sample.throttle_level;

            if level > ThrottleLevel::None {
                warn!(
                    "Resource pressure detected - CPU: {cpu:.1}%, RAM: {ram:.1}%, throttle level: {}",
                    level.as_u8()
                );
            } else {
                debug!("Resources OK - CPU: {cpu:.1}%, RAM: {ram:.1}%");
            }
            if !sample.resource_ok {
                error!(
                    "Resource limits exceeded! CPU: {cpu:.1}% (limit: {}%), RAM: {ram:.1}% (limit: {}%)",
                    self.limits.max_cpu_percent, self.limits.max_ram_percent
                );
            }

            if self.should_reclaim(ram, last_reclaim) {
                info!("Forcing memory reclaim due to high RAM usage ({ram:.1}%)");
                force_reclaim();
                metrics::GC_FORCED_TOTAL.inc();
                last_reclaim = Some(Instant::now());
                sample.last_reclaim_time = Some(unix_now());
            }

            self.state.publish_resources(sample);

            tokio::select! {
                _ = tokio::time::sleep(IDLE_INTERVAL) => {}
                _ = shutdown_rx.recv() => break,
            }
        }
        info!("Resource governor shutting down");
    }

    fn should_reclaim(&self, ram: f64, last_reclaim: Option<Instant>) -> bool {
        if !self.reclaim_enabled || ram <= RECLAIM_RAM_PERCENT {
            return false;
        }
        last_reclaim.is_none_or(|at| at.elapsed() >= RECLAIM_COOLDOWN)
    }
}

/// Returns freed allocator pages to the OS where the platform supports it.
#[cfg(target_os = "linux")]
fn force_reclaim() {
    unsafe {
        libc::malloc_trim(0);
    }
}

#[cfg(not(target_os = "linux"))]
fn force_reclaim() {
    debug!("Memory reclaim is a no-op on this platform");
}

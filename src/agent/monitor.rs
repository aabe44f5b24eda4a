// src/agent/monitor.rs

//! Phase G: the steady-state monitoring loop. Watches worker liveness,
//! restarts the dead, and logs a one-line status.

use super::context::AgentContext;
use super::spawner::CONTROL_API_WORKER;
use crate::core::metrics;
use crate::core::workers::RestartDecision;
use std::time::Duration;
use tracing::{error, info};

/// Cadence of the monitoring loop.
const MONITOR_INTERVAL: Duration = Duration::from_secs(30);

/// Runs until the shutdown flag is raised. Worker crashes never abort this
/// loop; a worker that keeps crashing is left down and recorded.
pub async fn run_monitor(ctx: &mut AgentContext) {
    info!("==== Phase G (steady-state monitoring) ====");
    info!("Pipeline is running; interval {}s", MONITOR_INTERVAL.as_secs());
    let mut shutdown_rx = ctx.shutdown_tx.subscribe();

    loop {
        if ctx.shutdown_requested() {
            break;
        }

        for worker in ctx.workers.iter_mut() {
            if worker.abandoned() || worker.alive() {
                continue;
            }
            let name = worker.name();
            metrics::WORKER_RESTARTS_TOTAL.with_label_values(&[name]).inc();
            match worker.record_crash() {
                RestartDecision::Restart => {
                    error!("Worker {name} died, restarting...");
                    worker.start();
                    if name == CONTROL_API_WORKER {
                        ctx.state.update_pipeline(|status| status.api_running = true);
                    }
                }
                RestartDecision::Abandon => {
                    error!(
                        "FATAL: worker {name} crashed three times within a minute; leaving it down"
                    );
                    if name == CONTROL_API_WORKER {
                        ctx.state.update_pipeline(|status| status.api_running = false);
                    }
                }
            }
        }

        let snapshot = ctx.state.snapshot();
        info!(
            "Status - CPU: {:.1}%, RAM: {:.1}%, throttle: {}, remote ready: {}, API: {}",
            snapshot.cpu_percent,
            snapshot.ram_percent,
            snapshot.throttle_level,
            snapshot.aws_ready,
            snapshot.api_running
        );

        tokio::select! {
            _ = tokio::time::sleep(MONITOR_INTERVAL) => {}
            _ = shutdown_rx.recv() => break,
        }
    }
    info!("Monitoring loop exited");
}

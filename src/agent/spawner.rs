// src/agent/spawner.rs

//! Builds and starts the four worker handles, in their required order:
//! resource governor, connectivity prober, telemetry exporter, control API.

use super::api_server::{self, ApiState};
use super::context::AgentContext;
use super::metrics_server;
use crate::core::workers::{ConnectivityProber, ResourceGovernor, WorkerHandle};
use tracing::info;

pub const GOVERNOR_WORKER: &str = "resource-governor";
pub const PROBER_WORKER: &str = "connectivity-prober";
pub const TELEMETRY_WORKER: &str = "telemetry-exporter";
pub const CONTROL_API_WORKER: &str = "control-api";

/// Creates the worker handles and launches each one. Handles live for the
/// whole process; the launch closures are re-invoked on restart.
pub fn spawn_workers(ctx: &mut AgentContext) {
    let config = ctx.config.get();

    let governor = {
        let limits = config.resources;
        let reclaim = config.features.reclaim_memory;
        let state = ctx.state.clone();
        let shutdown = ctx.shutdown_tx.clone();
        WorkerHandle::new(GOVERNOR_WORKER, config.timeouts.worker_stop, move || {
            let governor = ResourceGovernor::new(limits, reclaim, state.clone());
            tokio::spawn(governor.run(shutdown.subscribe()))
        })
    };

    let prober = {
        let state = ctx.state.clone();
        let client = ctx.remote.clone();
        let timeouts = config.timeouts;
        let retry = config.retry;
        let shutdown = ctx.shutdown_tx.clone();
        WorkerHandle::new(PROBER_WORKER, config.timeouts.worker_stop, move || {
            let prober = ConnectivityProber::new(state.clone(), client.clone(), timeouts, retry);
            tokio::spawn(prober.run(shutdown.subscribe()))
        })
    };

    let telemetry = {
        let state = ctx.state.clone();
        let port = config.telemetry.port;
        let shutdown = ctx.shutdown_tx.clone();
        WorkerHandle::new(TELEMETRY_WORKER, config.timeouts.worker_stop, move || {
            tokio::spawn(metrics_server::run_metrics_server(
                state.clone(),
                port,
                shutdown.clone(),
            ))
        })
    };

    let control_api = {
        let api_state = ApiState {
            shared: ctx.state.clone(),
            config: ctx.config.clone(),
            collaborators: ctx.collaborators.clone(),
            assets_dir: config.api.assets_dir.clone(),
        };
        let host = config.api.host.clone();
        let port = config.api.port;
        let shutdown = ctx.shutdown_tx.clone();
        WorkerHandle::new(CONTROL_API_WORKER, config.timeouts.api_stop, move || {
            tokio::spawn(api_server::run_api_server(
                api_state.clone(),
                host.clone(),
                port,
                shutdown.clone(),
            ))
        })
    };

    ctx.workers = vec![governor, prober, telemetry, control_api];
    for worker in ctx.workers.iter_mut() {
        worker.start();
    }
    ctx.state.update_pipeline(|p| p.api_running = true);
    info!("All workers started");
}

// src/agent/mod.rs

//! The supervisor: worker spawning, the deployment phase machine, and
//! shutdown propagation.

pub mod api_server;
pub mod context;
pub mod initialization;
pub mod metrics_server;
pub mod monitor;
pub mod phases;
pub mod spawner;

pub use phases::Phase;

use crate::config::ConfigStore;
use crate::core::errors::AgentError;
use context::AgentContext;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Waits for a shutdown signal based on the operating system.
/// On Unix, it listens for SIGINT and SIGTERM.
/// On Windows, it listens for Ctrl+C.
async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to create SIGINT stream");
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to create SIGTERM stream");
        tokio::select! {
            _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
            _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to create Ctrl+C stream");
        info!("Ctrl-C received, initiating graceful shutdown.");
    }
}

/// The main supervisor flow: start workers, drive phases A-F, then monitor
/// (phase G) until shutdown. Any phase failure propagates out after the
/// workers have been stopped; the binary maps it to exit code 1.
pub async fn run(config_store: Arc<ConfigStore>) -> Result<(), AgentError> {
    let mut ctx = initialization::setup(config_store)?;
    spawner::spawn_workers(&mut ctx);

    {
        let flag = ctx.shutdown_flag.clone();
        let shutdown_tx = ctx.shutdown_tx.clone();
        tokio::spawn(async move {
            await_shutdown_signal().await;
            flag.store(true, Ordering::SeqCst);
            let _ = shutdown_tx.send(());
        });
    }

    let deployment = phases::run_deployment(&ctx).await;
    if deployment.is_ok() && !ctx.shutdown_requested() {
        monitor::run_monitor(&mut ctx).await;
    }

    stop_workers(&mut ctx).await;

    match &deployment {
        Ok(()) => info!("Agent stopped successfully"),
        Err(e) => error!("Deployment aborted: {e}"),
    }
    deployment
}

/// Stops the workers in reverse start order within their deadlines.
async fn stop_workers(ctx: &mut AgentContext) {
    info!("Stopping workers...");
    ctx.shutdown_flag.store(true, Ordering::SeqCst);
    let _ = ctx.shutdown_tx.send(());
    for worker in ctx.workers.iter_mut().rev() {
        worker.stop().await;
    }
    info!("All workers stopped");
}

// src/agent/initialization.rs

//! Assembles all supervisor-owned components before any worker starts.

use super::context::AgentContext;
use crate::config::{Config, ConfigStore};
use crate::core::collaborators::command::{CommandRunner, ProcessRunner};
use crate::core::collaborators::compose::ComposeStack;
use crate::core::collaborators::inspector::InspectorService;
use crate::core::collaborators::snapshot::SnapshotWorkflow;
use crate::core::collaborators::CollaboratorSet;
use crate::core::errors::AgentError;
use crate::core::remote::RemoteClusterClient;
use crate::core::state::SharedState;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Builds the agent context. The shared-state bus is created here, before
/// any worker exists, and seeded with the configured endpoint so the prober
/// has a target even before remote discovery runs.
pub fn setup(config_store: Arc<ConfigStore>) -> Result<AgentContext, AgentError> {
    let config = config_store.get();
    log_startup_info(&config);

    let state = Arc::new(SharedState::new(config.remote.endpoint.clone()));
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner);

    let compose = Arc::new(ComposeStack::new(
        config.pipeline.compose_file.clone(),
        runner.clone(),
        config.timeouts.subprocess,
    ));
    let inspector = Arc::new(InspectorService::new(&config, runner.clone()));
    let collaborators = Arc::new(CollaboratorSet::build(
        &config,
        compose.clone(),
        inspector.clone(),
    ));
    let remote = Arc::new(RemoteClusterClient::new(&config)?);
    let snapshot = SnapshotWorkflow::new(&config.snapshot, runner, config.timeouts.subprocess);

    let (shutdown_tx, _) = broadcast::channel(1);

    info!("Agent context initialized");
    Ok(AgentContext {
        config: config_store,
        state,
        compose,
        inspector,
        collaborators,
        remote,
        snapshot,
        shutdown_tx,
        shutdown_flag: Arc::new(AtomicBool::new(false)),
        workers: Vec::new(),
    })
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    info!(
        "Resource ceilings: CPU {}%, RAM {}%; throttle thresholds {}/{}/{}",
        config.resources.max_cpu_percent,
        config.resources.max_ram_percent,
        config.resources.throttle_threshold_1,
        config.resources.throttle_threshold_2,
        config.resources.throttle_threshold_3,
    );
    if config.host.network_interface != "eth0" {
        warn!(
            "Network interface is {}, expected eth0",
            config.host.network_interface
        );
    }
    match &config.remote.domain {
        Some(domain) => info!("Remote cluster: domain '{domain}' in {}", config.remote.region),
        None => info!(
            "Remote cluster: fixed endpoint {}",
            config.remote.endpoint.as_deref().unwrap_or("(unset)")
        ),
    }
}

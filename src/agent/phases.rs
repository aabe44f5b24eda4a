// src/agent/phases.rs

//! The deployment phase machine. Phases are linear and advance only on
//! success: failures in A through E abort the process, the versioned
//! snapshot (F) is best-effort, and steady-state monitoring (G) lives in
//! the monitor module.

use super::context::AgentContext;
use crate::core::collaborators::shipper;
use crate::core::errors::AgentError;
use crate::core::state::PipelineStatus;
use std::time::Instant;
use tracing::{error, info, warn};

/// A discrete stage of the deployment state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    RemoteVerification,
    ConfigGeneration,
    StackBringUp,
    ConnectivityWait,
    PipelineVerification,
    Snapshot,
    Monitoring,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::RemoteVerification => "A (remote-cluster verification)",
            Self::ConfigGeneration => "B (config generation)",
            Self::StackBringUp => "C (local stack bring-up)",
            Self::ConnectivityWait => "D (connectivity wait)",
            Self::PipelineVerification => "E (pipeline verification)",
            Self::Snapshot => "F (versioned snapshot)",
            Self::Monitoring => "G (steady-state monitoring)",
        }
    }
}

fn enter(phase: Phase) {
    info!("==== Phase {} ====", phase.label());
}

fn fail(phase: Phase, e: AgentError) -> AgentError {
    error!("Phase {} failed: {e}", phase.label());
    e
}

/// Any transport-level error during remote verification is a
/// remote-unavailable failure as far as the phase machine is concerned.
fn remote_err(e: AgentError) -> AgentError {
    match e {
        e @ AgentError::RemoteUnavailable(_) => e,
        other => AgentError::RemoteUnavailable(other.to_string()),
    }
}

/// Runs phases A through F in order. Stops early (without error) when a
/// shutdown signal arrives between phases.
pub async fn run_deployment(ctx: &AgentContext) -> Result<(), AgentError> {
    let sequence = [
        Phase::RemoteVerification,
        Phase::ConfigGeneration,
        Phase::StackBringUp,
        Phase::ConnectivityWait,
        Phase::PipelineVerification,
    ];
    for phase in sequence {
        if ctx.shutdown_requested() {
            info!("Shutdown requested, skipping remaining phases");
            return Ok(());
        }
        enter(phase);
        let result = match phase {
            Phase::RemoteVerification => phase_a(ctx).await,
            Phase::ConfigGeneration => phase_b(ctx).await,
            Phase::StackBringUp => phase_c(ctx).await,
            Phase::ConnectivityWait => phase_d(ctx).await,
            Phase::PipelineVerification => phase_e(ctx).await,
            Phase::Snapshot | Phase::Monitoring => Ok(()),
        };
        result.map_err(|e| fail(phase, e))?;
        info!("Phase {} completed", phase.label());
    }

    if !ctx.shutdown_requested() {
        enter(Phase::Snapshot);
        phase_f(ctx).await;
    }
    Ok(())
}

/// Phase A: credentials must be valid and the cluster addressable. The
/// discovered endpoint lands in shared state and, when the configuration had
/// none, is persisted back to the file.
async fn phase_a(ctx: &AgentContext) -> Result<(), AgentError> {
    let config = ctx.config.get();

    info!("Verifying remote credentials...");
    let arn = ctx
        .remote
        .verify_credentials()
        .await
        .map_err(remote_err)?;
    info!("Credentials verified - caller: {arn}");

    let endpoint = match &config.remote.domain {
        Some(domain) => {
            info!("Verifying cluster domain: {domain}");
            let status = ctx.remote.describe_domain(domain).await.map_err(remote_err)?;
            if !status.is_ready() {
                return Err(AgentError::RemoteUnavailable(format!(
                    "domain '{domain}' is not ready (created: {}, deleted: {}, processing: {})",
                    status.created, status.deleted, status.processing
                )));
            }
            let host = status.endpoint.unwrap_or_default();
            if host.starts_with("http") {
                host
            } else {
                format!("https://{host}")
            }
        }
        None => match config.remote.endpoint.clone() {
            Some(endpoint) => {
                info!("No cluster domain configured, using fixed endpoint");
                endpoint
            }
            None => {
                return Err(AgentError::RemoteUnavailable(
                    "neither remote.domain nor remote.endpoint is configured".to_string(),
                ));
            }
        },
    };

    info!("Remote endpoint: {endpoint}");
    ctx.state.set_endpoint(endpoint.clone());
    if config.remote.endpoint.as_deref() != Some(endpoint.as_str()) {
        info!("Persisting discovered endpoint to the configuration file");
        ctx.config.set_endpoint(&endpoint)?;
    }
    Ok(())
}

/// Phase B: render and validate the inspector and shipper configurations.
async fn phase_b(ctx: &AgentContext) -> Result<(), AgentError> {
    info!("Generating inspector configuration...");
    ctx.inspector.generate_config().await?;
    ctx.inspector.validate_config().await?;

    info!("Generating shipper configuration...");
    // Re-read the store: phase A may have just filled in the endpoint.
    let config = ctx.config.get();
    shipper::generate_shipper_config(&config).await?;
    Ok(())
}

/// Phase C: bring the compose stack up and wait for every service.
async fn phase_c(ctx: &AgentContext) -> Result<(), AgentError> {
    let config = ctx.config.get();

    ctx.compose.verify_compose_file().await?;
    if config.features.pull_images {
        ctx.compose.pull().await?;
    }
    ctx.compose.up().await?;
    ctx.compose
        .wait_for_stack_healthy(&config.pipeline.services, config.timeouts.stack_health)
        .await?;

    for service in &config.pipeline.services {
        let running = ctx.compose.service_running(service).await?;
        ctx.state
            .update_pipeline(|status| apply_service_flag(status, service, running));
    }
    Ok(())
}

/// Phase D: poll shared state until the prober reports the remote ready.
async fn phase_d(ctx: &AgentContext) -> Result<(), AgentError> {
    let timeouts = ctx.config.get().timeouts;
    info!(
        "Waiting up to {}s for remote connectivity...",
        timeouts.connectivity_wait.as_secs()
    );
    wait_for_connectivity(
        &ctx.state,
        ctx.shutdown_tx.subscribe(),
        timeouts.connectivity_wait,
        timeouts.connectivity_poll,
    )
    .await
}

/// Polls `aws_ready` every `poll` until set, the deadline passes, or the
/// shutdown signal arrives (which ends the wait without error).
pub async fn wait_for_connectivity(
    state: &crate::core::state::SharedState,
    mut shutdown_rx: tokio::sync::broadcast::Receiver<()>,
    wait: std::time::Duration,
    poll: std::time::Duration,
) -> Result<(), AgentError> {
    let started = Instant::now();
    loop {
        if state.aws_ready() {
            info!("Remote connectivity verified");
            return Ok(());
        }
        if started.elapsed() >= wait {
            return Err(AgentError::RemoteUnavailable(format!(
                "timeout waiting for remote connectivity after {}s",
                wait.as_secs()
            )));
        }

        let connectivity = state.connectivity();
        info!(
            "Connectivity status - DNS: {}, TLS: {}, bulk: {}",
            connectivity.dns_ok, connectivity.tls_ok, connectivity.opensearch_ok
        );
        tokio::select! {
            _ = tokio::time::sleep(poll) => {}
            _ = shutdown_rx.recv() => return Ok(()),
        }
    }
}

/// Phase E: the compose stack fully running and the remote ready.
///
/// The inspector is not part of this gate: it is a host service the agent
/// renders configuration for but does not launch; operators start it through
/// the control API.
async fn phase_e(ctx: &AgentContext) -> Result<(), AgentError> {
    let config = ctx.config.get();
    let mut stopped = Vec::new();
    for service in &config.pipeline.services {
        let running = match ctx.compose.service_running(service).await {
            Ok(running) => running,
            Err(e) => {
                error!("Could not query service {service}: {e}");
                false
            }
        };
        ctx.state
            .update_pipeline(|status| apply_service_flag(status, service, running));
        if !running {
            stopped.push(service.clone());
        }
    }
    if !stopped.is_empty() {
        return Err(AgentError::collaborator(
            &stopped.join(", "),
            "not running during pipeline verification",
        ));
    }

    if !ctx.state.aws_ready() {
        return Err(AgentError::RemoteUnavailable(
            "remote not ready during pipeline verification".to_string(),
        ));
    }
    if !ctx.state.resources().resource_ok {
        warn!("Resource usage exceeds limits");
    }

    ctx.state.update_pipeline(|status| status.pipeline_ok = true);
    info!("Pipeline is operational");
    Ok(())
}

/// Phase F: best-effort versioned snapshot. Never fails the deployment.
async fn phase_f(ctx: &AgentContext) {
    if !ctx.config.get().features.snapshot {
        info!("Versioned snapshot disabled by feature flag");
        return;
    }
    match ctx.snapshot.commit_and_push().await {
        Ok(true) => info!("Phase {} completed", Phase::Snapshot.label()),
        Ok(false) => info!("Phase {} completed (nothing to snapshot)", Phase::Snapshot.label()),
        Err(e) => warn!("Versioned snapshot failed (continuing anyway): {e}"),
    }
}

/// Maps a collaborator name onto its shared-state flag.
pub fn apply_service_flag(status: &mut PipelineStatus, name: &str, running: bool) {
    match name {
        "vector" => status.vector_running = running,
        "suricata" => status.suricata_running = running,
        "redis" => status.redis_running = running,
        _ => {}
    }
}

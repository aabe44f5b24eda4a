// src/core/collaborators/compose.rs

//! Drives the local compose stack and exposes its services as collaborators.

use super::command::{CommandOutput, CommandRunner};
use super::{Collaborator, HEALTH_POLL_INTERVAL};
use crate::core::errors::AgentError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Wrapper over `docker compose -f <file> ...` for the whole stack.
pub struct ComposeStack {
    compose_file: PathBuf,
    runner: Arc<dyn CommandRunner>,
    subprocess_timeout: Duration,
}

impl ComposeStack {
    pub fn new(
        compose_file: PathBuf,
        runner: Arc<dyn CommandRunner>,
        subprocess_timeout: Duration,
    ) -> Self {
        Self {
            compose_file,
            runner,
            subprocess_timeout,
        }
    }

    async fn compose(&self, args: &[&str]) -> Result<CommandOutput, AgentError> {
        let file = self.compose_file.to_string_lossy();
        let mut full_args = vec!["compose", "-f", file.as_ref()];
        full_args.extend_from_slice(args);
        self.runner
            .run("docker", &full_args, self.subprocess_timeout)
            .await
    }

    /// The compose file must exist and pass `config --quiet`.
    pub async fn verify_compose_file(&self) -> Result<(), AgentError> {
        if !self.compose_file.exists() {
            return Err(AgentError::collaborator(
                "compose",
                format!("compose file not found: {}", self.compose_file.display()),
            ));
        }
        let output = self.compose(&["config", "--quiet"]).await?;
        if output.success() {
            info!("Compose file is valid");
            Ok(())
        } else {
            Err(AgentError::collaborator(
                "compose",
                format!("compose file validation failed: {}", output.stderr.trim()),
            ))
        }
    }

    pub async fn pull(&self) -> Result<(), AgentError> {
        info!("Pulling stack images...");
        let output = self.compose(&["pull"]).await?;
        if output.success() {
            Ok(())
        } else {
            Err(AgentError::collaborator(
                "compose",
                format!("image pull failed: {}", output.stderr.trim()),
            ))
        }
    }

    pub async fn up(&self) -> Result<(), AgentError> {
        info!("Starting compose stack...");
        let output = self.compose(&["up", "-d"]).await?;
        if output.success() {
            info!("Compose stack started");
            Ok(())
        } else {
            Err(AgentError::collaborator(
                "compose",
                format!("stack bring-up failed: {}", output.stderr.trim()),
            ))
        }
    }

    /// Whether a single service currently reports `running`.
    pub async fn service_running(&self, service: &str) -> Result<bool, AgentError> {
        let output = self
            .compose(&["ps", "--format", "json", service])
            .await?;
        if !output.success() {
            return Ok(false);
        }
        Ok(parse_ps_running(&output.stdout))
    }

    /// Polls every service until all report running or the deadline passes.
    pub async fn wait_for_stack_healthy(
        &self,
        services: &[String],
        max_wait: Duration,
    ) -> Result<(), AgentError> {
        let started = Instant::now();
        for service in services {
            loop {
                if self.service_running(service).await? {
                    info!("Service {service} is running");
                    break;
                }
                if started.elapsed() >= max_wait {
                    error!("Timeout waiting for service {service}");
                    return Err(AgentError::collaborator(
                        service,
                        format!("did not become healthy within {}s", max_wait.as_secs()),
                    ));
                }
                debug!("Service {service} not ready yet, waiting...");
                tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
        info!("All compose services are healthy");
        Ok(())
    }
}

/// Parses `ps --format json` output: one JSON object per line, state in the
/// `State` field.
pub fn parse_ps_running(stdout: &str) -> bool {
    stdout.lines().filter_map(|line| {
        serde_json::from_str::<serde_json::Value>(line.trim()).ok()
    }).any(|entry| {
        entry["State"]
            .as_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("running"))
    })
}

/// One compose-file service as a collaborator handle. Operations are
/// serialized by the internal lock: one in-flight call per handle.
pub struct ComposeService {
    name: String,
    stack: Arc<ComposeStack>,
    op_lock: Mutex<()>,
}

impl ComposeService {
    pub fn new(name: String, stack: Arc<ComposeStack>) -> Self {
        Self {
            name,
            stack,
            op_lock: Mutex::new(()),
        }
    }

    async fn service_op(&self, verb: &str) -> Result<(), AgentError> {
        let output = self.stack.compose(&[verb, &self.name]).await?;
        if output.success() {
            info!("Service {}: {verb} succeeded", self.name);
            Ok(())
        } else {
            Err(AgentError::collaborator(
                &self.name,
                format!("{verb} failed: {}", output.stderr.trim()),
            ))
        }
    }
}

#[async_trait]
impl Collaborator for ComposeService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        // `up -d <service>` is idempotent: a running service stays as the
        // single running instance.
        let output = self.stack.compose(&["up", "-d", &self.name]).await?;
        if output.success() {
            Ok(())
        } else {
            Err(AgentError::collaborator(
                &self.name,
                format!("start failed: {}", output.stderr.trim()),
            ))
        }
    }

    async fn stop(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        self.service_op("stop").await
    }

    async fn restart(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        self.service_op("restart").await
    }

    async fn is_running(&self) -> Result<bool, AgentError> {
        let _guard = self.op_lock.lock().await;
        self.stack.service_running(&self.name).await
    }
}

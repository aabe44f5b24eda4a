// src/core/collaborators/inspector.rs

//! The packet inspector (Suricata): configuration rendering and host-service
//! lifecycle control.

use super::command::CommandRunner;
use super::Collaborator;
use crate::config::Config;
use crate::core::errors::AgentError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The systemd unit the inspector runs under.
const INSPECTOR_UNIT: &str = "suricata";

/// Renders the inspector configuration from the loaded agent config.
///
/// Tuned for a quad-core board: a single worker thread pinned away from the
/// shipper, events written to the RAM-backed eve log.
pub fn render_inspector_config(config: &Config) -> String {
    let inspector = &config.inspector;
    let interface = &config.host.network_interface;
    let eve_log = config.pipeline.log_file.display();
    let rule_files = inspector
        .rule_files
        .iter()
        .map(|f| format!("  - {f}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"%YAML 1.1
---
vars:
  address-groups:
    HOME_NET: "{home_net}"
    EXTERNAL_NET: "{external_net}"

af-packet:
  - interface: {interface}
    threads: 1
    cluster-id: 99
    cluster-type: cluster_flow
    defrag: yes

outputs:
  - eve-log:
      enabled: yes
      filetype: regular
      filename: {eve_log}
      types:
        - alert
        - anomaly
        - stats

rule-files:
{rule_files}

threading:
  set-cpu-affinity: yes
  cpu-affinity:
    - worker-cpu-set:
        cpu: ["1"]

app-layer:
  protocols:
    tls:
      enabled: yes
    http:
      enabled: yes
"#,
        home_net = inspector.home_net,
        external_net = inspector.external_net,
    )
}

/// Collaborator handle for the inspector. Lifecycle goes through the host's
/// service manager; configuration is rendered by the agent.
pub struct InspectorService {
    config_file: PathBuf,
    rendered: String,
    runner: Arc<dyn CommandRunner>,
    subprocess_timeout: Duration,
    op_lock: Mutex<()>,
}

impl InspectorService {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config_file: config.inspector.config_file.clone(),
            rendered: render_inspector_config(config),
            runner,
            subprocess_timeout: config.timeouts.subprocess,
            op_lock: Mutex::new(()),
        }
    }

    /// Writes the rendered configuration, creating parent directories.
    pub async fn generate_config(&self) -> Result<(), AgentError> {
        if let Some(parent) = self.config_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.config_file, &self.rendered).await?;
        info!(
            "Inspector configuration written to {}",
            self.config_file.display()
        );
        Ok(())
    }

    /// Syntactic validation of the rendered document, plus a `suricata -T`
    /// pass when the binary is installed. A failed binary check is only a
    /// warning: the inspector may live on another host image.
    pub async fn validate_config(&self) -> Result<(), AgentError> {
        serde_yaml::from_str::<serde_yaml::Value>(&self.rendered).map_err(|e| {
            AgentError::collaborator(INSPECTOR_UNIT, format!("rendered config is not YAML: {e}"))
        })?;

        let file = self.config_file.to_string_lossy();
        match self
            .runner
            .run(
                "suricata",
                &["-T", "-c", file.as_ref()],
                self.subprocess_timeout,
            )
            .await
        {
            Ok(output) if output.success() => {
                info!("Inspector configuration validated");
            }
            Ok(output) => {
                warn!(
                    "Inspector configuration validation failed (may be OK if not installed): {}",
                    output.stderr.trim()
                );
            }
            Err(e) => {
                warn!("Could not run inspector validation: {e}");
            }
        }
        Ok(())
    }

    async fn systemctl(&self, verb: &str) -> Result<(), AgentError> {
        let output = self
            .runner
            .run("systemctl", &[verb, INSPECTOR_UNIT], self.subprocess_timeout)
            .await?;
        if output.success() {
            info!("Inspector: {verb} succeeded");
            Ok(())
        } else {
            Err(AgentError::collaborator(
                INSPECTOR_UNIT,
                format!("{verb} failed: {}", output.stderr.trim()),
            ))
        }
    }
}

#[async_trait]
impl Collaborator for InspectorService {
    fn name(&self) -> &str {
        INSPECTOR_UNIT
    }

    async fn start(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        self.systemctl("start").await
    }

    async fn stop(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        self.systemctl("stop").await
    }

    async fn restart(&self) -> Result<(), AgentError> {
        let _guard = self.op_lock.lock().await;
        self.systemctl("restart").await
    }

    async fn is_running(&self) -> Result<bool, AgentError> {
        let _guard = self.op_lock.lock().await;
        let output = self
            .runner
            .run(
                "systemctl",
                &["is-active", "--quiet", INSPECTOR_UNIT],
                self.subprocess_timeout,
            )
            .await?;
        Ok(output.success())
    }
}

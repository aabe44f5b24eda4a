// src/core/collaborators/mod.rs

//! Handles for the external components whose lifecycle the agent controls but
//! whose internals are out of scope: the packet inspector, the log shipper,
//! and the side-buffer store.

pub mod command;
pub mod compose;
pub mod inspector;
pub mod shipper;
pub mod snapshot;

use crate::config::Config;
use crate::core::errors::AgentError;
use async_trait::async_trait;
use compose::{ComposeService, ComposeStack};
use inspector::InspectorService;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll cadence for health waits.
pub(crate) const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A controllable external component. Implementations serialize their
/// operations internally: one in-flight call per handle, later callers wait.
#[async_trait]
pub trait Collaborator: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self) -> Result<(), AgentError>;

    async fn stop(&self) -> Result<(), AgentError>;

    async fn restart(&self) -> Result<(), AgentError>;

    async fn is_running(&self) -> Result<bool, AgentError>;

    /// Polls `is_running` until healthy or the deadline passes.
    async fn wait_until_healthy(&self, deadline: Duration) -> Result<(), AgentError> {
        let started = Instant::now();
        loop {
            if self.is_running().await? {
                return Ok(());
            }
            if started.elapsed() >= deadline {
                return Err(AgentError::collaborator(
                    self.name(),
                    format!("not healthy within {}s", deadline.as_secs()),
                ));
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }
}

/// The supervisor-owned set of collaborator handles, looked up by the service
/// names the control API accepts.
pub struct CollaboratorSet {
    handles: Vec<Arc<dyn Collaborator>>,
}

impl CollaboratorSet {
    /// Builds the full set from the configuration: the inspector plus every
    /// service declared in the compose file.
    pub fn build(
        config: &Config,
        stack: Arc<ComposeStack>,
        inspector: Arc<InspectorService>,
    ) -> Self {
        let mut handles: Vec<Arc<dyn Collaborator>> = vec![inspector];
        for service in &config.pipeline.services {
            handles.push(Arc::new(ComposeService::new(service.clone(), stack.clone())));
        }
        Self { handles }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Collaborator>> {
        self.handles.iter().find(|h| h.name() == name).cloned()
    }
}

// src/agent/context.rs

//! Holds all supervisor-owned components, assembled during initialization.

use crate::config::ConfigStore;
use crate::core::collaborators::compose::ComposeStack;
use crate::core::collaborators::inspector::InspectorService;
use crate::core::collaborators::snapshot::SnapshotWorkflow;
use crate::core::collaborators::CollaboratorSet;
use crate::core::remote::RemoteClusterClient;
use crate::core::state::SharedState;
use crate::core::workers::WorkerHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Everything the supervisor needs to drive the deployment and the steady
/// state: configuration, the shared-state bus, collaborator handles, the
/// remote client, and the worker handles in their start order.
pub struct AgentContext {
    pub config: Arc<ConfigStore>,
    pub state: Arc<SharedState>,
    pub compose: Arc<ComposeStack>,
    pub inspector: Arc<InspectorService>,
    pub collaborators: Arc<CollaboratorSet>,
    pub remote: Arc<RemoteClusterClient>,
    pub snapshot: SnapshotWorkflow,
    /// Signal fan-out observed by every worker loop.
    pub shutdown_tx: broadcast::Sender<()>,
    /// The flag set by the signal handlers, read by the phase loops.
    pub shutdown_flag: Arc<AtomicBool>,
    /// Worker handles in start order; stopped in reverse order at shutdown.
    pub workers: Vec<WorkerHandle>,
}

impl AgentContext {
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }
}

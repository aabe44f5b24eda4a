// src/core/state/pipeline.rs

//! State definitions for the supervisor-owned pipeline section of shared state.

/// Collaborator and worker liveness flags, written only by the supervisor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStatus {
    pub vector_running: bool,
    pub suricata_running: bool,
    pub redis_running: bool,
    pub api_running: bool,
    pub pipeline_ok: bool,
}

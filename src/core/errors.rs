// src/core/errors.rs

//! Defines the primary error type for the entire application.

use thiserror::Error;

/// The main error enum, representing all possible failures within the agent.
/// Using `thiserror` allows for clean error definitions and automatic `From` trait implementations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Missing secret: environment variable '{0}' is unset or empty")]
    MissingSecret(String),

    #[error("Remote cluster unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Collaborator '{name}' failed: {reason}")]
    CollaboratorFailed { name: String, reason: String },

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Worker '{0}' crashed")]
    WorkerCrashed(String),

    #[error("Subprocess '{command}' timed out after {seconds}s")]
    SubprocessTimeout { command: String, seconds: u64 },

    #[error("Version control operation failed: {0}")]
    VersionControlFailed(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentError {
    /// Maps a collaborator-level failure into the error kind with its name attached.
    pub fn collaborator(name: &str, reason: impl Into<String>) -> Self {
        Self::CollaboratorFailed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

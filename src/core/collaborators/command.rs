// src/core/collaborators/command.rs

//! Subprocess execution behind a trait, so orchestration code depends on an
//! interface rather than a specific shell or CLI.

use crate::core::errors::AgentError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs external commands with a hard deadline. Expiry maps to
/// [`AgentError::SubprocessTimeout`], which callers treat as the failure of
/// whatever phase wrapped the invocation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, AgentError>;
}

/// The production runner on top of `tokio::process`.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, AgentError> {
        debug!("Running: {program} {}", args.join(" "));

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, output).await {
            Err(_) => Err(AgentError::SubprocessTimeout {
                command: format!("{program} {}", args.join(" ")),
                seconds: timeout.as_secs(),
            }),
            Ok(result) => {
                let output = result?;
                Ok(CommandOutput {
                    status: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }
}

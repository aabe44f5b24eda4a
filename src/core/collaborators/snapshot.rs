// src/core/collaborators/snapshot.rs

//! The versioned-snapshot workflow: commit and push regenerated pipeline
//! configuration when the working tree lives in a repository.

use super::command::CommandRunner;
use crate::config::SnapshotConfig;
use crate::core::errors::AgentError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct SnapshotWorkflow {
    runner: Arc<dyn CommandRunner>,
    remote: String,
    branch: String,
    commit_message: String,
    subprocess_timeout: Duration,
}

impl SnapshotWorkflow {
    pub fn new(
        config: &SnapshotConfig,
        runner: Arc<dyn CommandRunner>,
        subprocess_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            commit_message: config.commit_message.clone(),
            subprocess_timeout,
        }
    }

    async fn git(&self, args: &[&str]) -> Result<String, AgentError> {
        let output = self
            .runner
            .run("git", args, self.subprocess_timeout)
            .await
            .map_err(|e| AgentError::VersionControlFailed(e.to_string()))?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(AgentError::VersionControlFailed(format!(
                "git {} failed: {}",
                args.first().unwrap_or(&""),
                output.stderr.trim()
            )))
        }
    }

    pub async fn repo_exists(&self) -> bool {
        self.git(&["rev-parse", "--is-inside-work-tree"]).await.is_ok()
    }

    pub async fn has_changes(&self) -> Result<bool, AgentError> {
        let status = self.git(&["status", "--porcelain"]).await?;
        Ok(!status.trim().is_empty())
    }

    /// Stages everything, commits with the fixed message, and pushes.
    /// Returns `Ok(false)` when there was nothing to commit.
    pub async fn commit_and_push(&self) -> Result<bool, AgentError> {
        if !self.repo_exists().await {
            debug!("No repository found, skipping snapshot");
            return Ok(false);
        }
        if !self.has_changes().await? {
            info!("No changes to snapshot");
            return Ok(false);
        }

        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-m", &self.commit_message]).await?;
        self.git(&["push", &self.remote, &self.branch]).await?;
        info!(
            "Snapshot pushed to {}/{}: {}",
            self.remote, self.branch, self.commit_message
        );
        Ok(true)
    }
}

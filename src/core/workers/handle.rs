// src/core/workers/handle.rs

//! A restartable handle around one long-lived worker task.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Window for the crash-loop policy.
const CRASH_WINDOW: Duration = Duration::from_secs(60);
/// Crashes tolerated inside one window before the worker is left down.
const MAX_CRASHES_PER_WINDOW: usize = 3;

/// What the supervisor should do about a crashed worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    Restart,
    Abandon,
}

/// Owns a worker's launch closure and its live task. Created once by the
/// supervisor; the underlying task may be relaunched any number of times.
pub struct WorkerHandle {
    name: &'static str,
    launcher: Box<dyn Fn() -> JoinHandle<()> + Send + Sync>,
    task: Option<JoinHandle<()>>,
    stop_deadline: Duration,
    crashes: VecDeque<Instant>,
    abandoned: bool,
}

impl WorkerHandle {
    pub fn new(
        name: &'static str,
        stop_deadline: Duration,
        launcher: impl Fn() -> JoinHandle<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            launcher: Box::new(launcher),
            task: None,
            stop_deadline,
            crashes: VecDeque::new(),
            abandoned: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Launches (or relaunches) the worker task.
    pub fn start(&mut self) {
        self.task = Some((self.launcher)());
        info!("Worker {} started", self.name);
    }

    /// Whether the underlying task is still running.
    pub fn alive(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn abandoned(&self) -> bool {
        self.abandoned
    }

    /// Records a crash and decides whether to relaunch. Three crashes within
    /// one minute leave the worker down for the rest of the process lifetime.
    pub fn record_crash(&mut self) -> RestartDecision {
        let now = Instant::now();
        self.crashes.push_back(now);
        while let Some(&oldest) = self.crashes.front() {
            if now.duration_since(oldest) > CRASH_WINDOW {
                self.crashes.pop_front();
            } else {
                break;
            }
        }
        if self.crashes.len() >= MAX_CRASHES_PER_WINDOW {
            self.abandoned = true;
            RestartDecision::Abandon
        } else {
            RestartDecision::Restart
        }
    }

    /// Joins the task within the graceful-stop deadline, aborting on expiry.
    /// The shutdown broadcast must already have been sent.
    pub async fn stop(&mut self) {
        let Some(mut task) = self.task.take() else {
            return;
        };
        if task.is_finished() {
            return;
        }
        match tokio::time::timeout(self.stop_deadline, &mut task).await {
            Ok(_) => info!("Worker {} stopped", self.name),
            Err(_) => {
                warn!(
                    "Worker {} did not stop within {:?}, aborting",
                    self.name, self.stop_deadline
                );
                task.abort();
            }
        }
    }
}

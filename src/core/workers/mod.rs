// src/core/workers/mod.rs

//! The agent's long-lived internal workers and the restartable handles the
//! supervisor drives them through.

pub mod governor;
pub mod handle;
pub mod prober;

pub use governor::ResourceGovernor;
pub use handle::{RestartDecision, WorkerHandle};
pub use prober::ConnectivityProber;

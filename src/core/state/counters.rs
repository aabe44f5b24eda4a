// src/core/state/counters.rs

//! Monotonic event counters shared by all workers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters. The only shared-state section with more than one writer;
/// increments are atomic and values never decrease.
#[derive(Debug, Default)]
pub struct EventCounters {
    processed: AtomicU64,
    failed: AtomicU64,
}

impl EventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processed(&self, n: u64) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_failed(&self, n: u64) {
        self.failed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

// src/core/state/connectivity.rs

//! State definitions for the connectivity prober's section of shared state.

/// Outcome of one probe cycle. `aws_ready` is always the conjunction of the
/// three probe results; it is derived in the constructor so the invariant
/// cannot be broken by a caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectivitySnapshot {
    pub dns_ok: bool,
    pub tls_ok: bool,
    pub opensearch_ok: bool,
    pub aws_ready: bool,
    /// Unix seconds of the completed cycle.
    pub last_check: Option<u64>,
}

impl ConnectivitySnapshot {
    pub fn new(dns_ok: bool, tls_ok: bool, opensearch_ok: bool, checked_at: u64) -> Self {
        Self {
            dns_ok,
            tls_ok,
            opensearch_ok,
            aws_ready: dns_ok && tls_ok && opensearch_ok,
            last_check: Some(checked_at),
        }
    }
}

// src/core/workers/prober.rs

//! The connectivity prober: DNS, TLS, and bulk-ingest probes against the
//! remote cluster, fanned out concurrently each cycle.

use crate::config::{RetryConfig, TimeoutsConfig};
use crate::core::metrics;
use crate::core::remote::{BulkOutcome, RemoteClusterClient};
use crate::core::state::{unix_now, ConnectivitySnapshot, SharedState};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_rustls::TlsConnector;
use tracing::{debug, error, info, warn};
use url::Url;

/// Time between probe cycles.
const CYCLE_INTERVAL: Duration = Duration::from_secs(30);

/// Extracts the hostname from an endpoint URL.
pub fn endpoint_host(endpoint: &str) -> Option<String> {
    Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

pub struct ConnectivityProber {
    state: Arc<SharedState>,
    client: Arc<RemoteClusterClient>,
    timeouts: TimeoutsConfig,
    retry: RetryConfig,
    tls: TlsConnector,
}

impl ConnectivityProber {
    pub fn new(
        state: Arc<SharedState>,
        client: Arc<RemoteClusterClient>,
        timeouts: TimeoutsConfig,
        retry: RetryConfig,
    ) -> Self {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        Self {
            state,
            client,
            timeouts,
            retry,
            tls: TlsConnector::from(Arc::new(tls_config)),
        }
    }

    /// The main probe loop. In-flight probes are cancelled at their next
    /// suspension point when the shutdown signal arrives.
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("Connectivity prober started");
        loop {
            tokio::select! {
                _ = self.run_cycle() => {}
                _ = shutdown_rx.recv() => break,
            }
            tokio::select! {
                _ = tokio::time::sleep(CYCLE_INTERVAL) => {}
                _ = shutdown_rx.recv() => break,
            }
        }
        info!("Connectivity prober shutting down");
    }

    /// One probe cycle: DNS and TLS in parallel, bulk only when both passed.
    pub async fn run_cycle(&self) {
        let Some(endpoint) = self.state.endpoint() else {
            error!("No remote endpoint available for connectivity checks");
            self.state
                .publish_connectivity(ConnectivitySnapshot::new(false, false, false, unix_now()));
            return;
        };
        let Some(host) = endpoint_host(&endpoint) else {
            error!("Remote endpoint '{endpoint}' has no hostname");
            self.state
                .publish_connectivity(ConnectivitySnapshot::new(false, false, false, unix_now()));
            return;
        };

        debug!("Running connectivity checks for {host}...");
        let (dns_ok, tls_ok) = tokio::join!(self.check_dns(&host), self.check_tls(&host));

        let bulk_ok = if dns_ok && tls_ok {
            self.check_bulk(&endpoint).await
        } else {
            warn!("Skipping bulk probe due to DNS/TLS failure");
            false
        };

        let snapshot = ConnectivitySnapshot::new(dns_ok, tls_ok, bulk_ok, unix_now());
        self.state.publish_connectivity(snapshot);
        info!(
            "Connectivity check complete - DNS: {dns_ok}, TLS: {tls_ok}, bulk: {bulk_ok}, ready: {}",
            snapshot.aws_ready
        );
    }

    /// Success iff the resolver returns at least one address.
    async fn check_dns(&self, host: &str) -> bool {
        let lookup = tokio::net::lookup_host((host, 443));
        match tokio::time::timeout(self.timeouts.dns_probe, lookup).await {
            Ok(Ok(mut addrs)) => match addrs.next() {
                Some(addr) => {
                    debug!("DNS resolution successful: {host} -> {}", addr.ip());
                    true
                }
                None => {
                    error!("DNS resolution for {host} returned no addresses");
                    false
                }
            },
            Ok(Err(e)) => {
                error!("DNS resolution failed for {host}: {e}");
                false
            }
            Err(_) => {
                error!("DNS resolution timed out for {host}");
                false
            }
        }
    }

    /// Success iff the handshake completes and the peer chain validates
    /// against the system trust store.
    async fn check_tls(&self, host: &str) -> bool {
        match tokio::time::timeout(self.timeouts.tls_probe, self.tls_handshake(host)).await {
            Ok(Ok(())) => {
                debug!("TLS handshake successful with {host}");
                true
            }
            Ok(Err(e)) => {
                error!("TLS handshake failed for {host}:443: {e}");
                false
            }
            Err(_) => {
                error!("TLS handshake timed out for {host}:443");
                false
            }
        }
    }

    async fn tls_handshake(&self, host: &str) -> Result<(), std::io::Error> {
        let stream = TcpStream::connect((host, 443)).await?;
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| std::io::Error::other(format!("invalid server name: {e}")))?;
        self.tls.connect(server_name, stream).await?;
        Ok(())
    }

    /// Bulk probe with the retry policy: transport errors retry with
    /// exponential backoff, HTTP rejections are final.
    async fn check_bulk(&self, endpoint: &str) -> bool {
        let mut backoff = self.retry.backoff_min;
        for attempt in 1..=self.retry.bulk_attempts {
            match self.client.bulk_probe(endpoint).await {
                Ok(BulkOutcome::Accepted { latency, .. }) => {
                    metrics::INGESTION_LATENCY_SECONDS.observe(latency.as_secs_f64());
                    self.state.counters.add_processed(1);
                    debug!("Bulk probe succeeded in {latency:?}");
                    return true;
                }
                Ok(BulkOutcome::Rejected { status }) => {
                    self.state.counters.add_failed(1);
                    error!("Bulk probe rejected: HTTP {status}");
                    return false;
                }
                Err(e) => {
                    self.state.counters.add_failed(1);
                    if attempt == self.retry.bulk_attempts {
                        error!("Bulk probe failed after {attempt} attempts: {e}");
                        return false;
                    }
                    warn!("Bulk probe attempt {attempt} failed: {e}, retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.retry.backoff_max);
                }
            }
        }
        false
    }
}

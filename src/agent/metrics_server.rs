// src/agent/metrics_server.rs

//! The telemetry exporter: serves the Prometheus text exposition and keeps
//! the gauges mirrored from shared state.

use crate::core::metrics;
use crate::core::state::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Cadence of the background gauge refresh.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Handles HTTP requests to the /metrics endpoint.
///
/// Shared state is re-mirrored before gathering so a scrape is always
/// current; the mirror only copies lock-guarded values and completes well
/// under the one-second scrape budget.
async fn metrics_handler(State(state): State<Arc<SharedState>>) -> impl IntoResponse {
    metrics::sync_shared_state(&state);
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Runs the exporter on `0.0.0.0:<port>` until shutdown.
pub async fn run_metrics_server(
    state: Arc<SharedState>,
    port: u16,
    shutdown_tx: broadcast::Sender<()>,
) {
    metrics::set_build_info();

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind telemetry exporter on port {port}: {e}");
            return;
        }
    };
    info!("Telemetry exporter listening on http://{addr}/metrics");

    let mut refresh_rx = shutdown_tx.subscribe();
    let refresher = async move {
        loop {
            metrics::sync_shared_state(&state);
            tokio::select! {
                _ = tokio::time::sleep(REFRESH_INTERVAL) => {}
                _ = refresh_rx.recv() => break,
            }
        }
    };

    let mut serve_rx = shutdown_tx.subscribe();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        serve_rx.recv().await.ok();
        info!("Telemetry exporter shutting down");
    });

    let (served, _) = tokio::join!(server, refresher);
    if let Err(e) = served {
        error!("Telemetry exporter error: {e}");
    }
}

// src/agent/api_server.rs

//! The operator-facing control API: status, collaborator start/stop, and
//! configuration read/update.

use crate::config::{Config, ConfigStore};
use crate::core::collaborators::CollaboratorSet;
use crate::core::errors::AgentError;
use crate::core::state::{SharedState, StateSnapshot};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Shared pieces every handler can reach. Collaborator handles serialize
/// their own operations, so concurrent requests are safe here.
#[derive(Clone)]
pub struct ApiState {
    pub shared: Arc<SharedState>,
    pub config: Arc<ConfigStore>,
    pub collaborators: Arc<CollaboratorSet>,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub service: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub status: &'static str,
    pub message: String,
}

impl ControlResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy)]
enum ControlAction {
    Start,
    Stop,
}

impl ControlAction {
    fn verb(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Serves the dashboard from the static assets directory.
async fn index(State(state): State<ApiState>) -> Html<String> {
    let path = state.assets_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body),
        Err(_) => Html(
            "<html><body><h1>IDS2 SOC Pipeline</h1><p>Dashboard assets not found.</p></body></html>"
                .to_string(),
        ),
    }
}

/// Returns the entire shared state as JSON.
async fn get_status(State(state): State<ApiState>) -> Json<StateSnapshot> {
    Json(state.shared.snapshot())
}

async fn control_start(
    State(state): State<ApiState>,
    Json(request): Json<ControlRequest>,
) -> (StatusCode, Json<ControlResponse>) {
    dispatch_control(state, request, ControlAction::Start).await
}

async fn control_stop(
    State(state): State<ApiState>,
    Json(request): Json<ControlRequest>,
) -> (StatusCode, Json<ControlResponse>) {
    dispatch_control(state, request, ControlAction::Stop).await
}

async fn dispatch_control(
    state: ApiState,
    request: ControlRequest,
    action: ControlAction,
) -> (StatusCode, Json<ControlResponse>) {
    let Some(service) = request.service else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ControlResponse::error("Service name not provided")),
        );
    };
    let Some(handle) = state.collaborators.get(&service) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ControlResponse::error(format!("Unknown service: {service}"))),
        );
    };

    info!("Request to {} service: {service}", action.verb());
    let result = match action {
        ControlAction::Start => handle.start().await,
        ControlAction::Stop => handle.stop().await,
    };
    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(ControlResponse::success(format!(
                "Service {service}: {} succeeded",
                action.verb()
            ))),
        ),
        Err(e) => {
            error!("Service {service}: {} failed: {e}", action.verb());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ControlResponse::error(e.to_string())),
            )
        }
    }
}

/// Returns the loaded configuration (secrets are never serialized).
async fn get_config(State(state): State<ApiState>) -> Json<Config> {
    Json(state.config.get())
}

/// Validates and applies a whitelisted configuration patch, persisting it to
/// the on-disk file on success.
async fn update_config(
    State(state): State<ApiState>,
    Json(patch): Json<serde_json::Value>,
) -> (StatusCode, Json<ControlResponse>) {
    match state.config.apply_patch(&patch) {
        Ok(applied) => (
            StatusCode::OK,
            Json(ControlResponse::success(format!(
                "Updated: {}",
                applied.join(", ")
            ))),
        ),
        Err(e @ AgentError::ConfigInvalid(_)) => {
            (StatusCode::BAD_REQUEST, Json(ControlResponse::error(e.to_string())))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ControlResponse::error(e.to_string())),
        ),
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(get_status))
        .route("/api/control/start", post(control_start))
        .route("/api/control/stop", post(control_stop))
        .route("/api/config", get(get_config))
        .route("/api/config/update", post(update_config))
        .with_state(state)
}

/// Serves the control API on an already-bound listener until shutdown.
pub async fn serve_on(listener: TcpListener, state: ApiState, shutdown_tx: broadcast::Sender<()>) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let server = axum::serve(listener, router(state)).with_graceful_shutdown(async move {
        shutdown_rx.recv().await.ok();
        info!("Control API shutting down");
    });
    if let Err(e) = server.await {
        error!("Control API error: {e}");
    }
}

/// Binds and runs the control API on the configured host and port.
pub async fn run_api_server(
    state: ApiState,
    host: String,
    port: u16,
    shutdown_tx: broadcast::Sender<()>,
) {
    let listener = match TcpListener::bind((host.as_str(), port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind control API on {host}:{port}: {e}");
            return;
        }
    };
    info!("Control API listening on http://{host}:{port}");
    serve_on(listener, state, shutdown_tx).await;
}

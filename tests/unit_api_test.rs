use async_trait::async_trait;
use ids2_agent::agent::api_server::{serve_on, ApiState};
use ids2_agent::config::ConfigStore;
use ids2_agent::core::collaborators::command::{CommandOutput, CommandRunner};
use ids2_agent::core::collaborators::compose::ComposeStack;
use ids2_agent::core::collaborators::inspector::InspectorService;
use ids2_agent::core::collaborators::CollaboratorSet;
use ids2_agent::core::state::SharedState;
use ids2_agent::core::AgentError;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;

/// Runner that reports every service as startable and running.
struct AlwaysHealthyRunner;

#[async_trait]
impl CommandRunner for AlwaysHealthyRunner {
    async fn run(
        &self,
        _program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput, AgentError> {
        let stdout = if args.contains(&"ps") {
            r#"{"Service":"vector","State":"running"}"#.to_string()
        } else {
            String::new()
        };
        Ok(CommandOutput {
            status: 0,
            stdout,
            stderr: String::new(),
        })
    }
}

struct TestApi {
    base: String,
    _config_file: NamedTempFile,
    _shutdown_tx: broadcast::Sender<()>,
    store: Arc<ConfigStore>,
    state: Arc<SharedState>,
}

async fn start_api() -> TestApi {
    let mut config_file = NamedTempFile::new().unwrap();
    config_file.write_all(b"log_level: info\n").unwrap();
    let store = Arc::new(ConfigStore::load(config_file.path()).unwrap());
    let config = store.get();

    let state = Arc::new(SharedState::new(Some(
        "https://demo.cluster.example:443".to_string(),
    )));
    let runner: Arc<dyn CommandRunner> = Arc::new(AlwaysHealthyRunner);
    let stack = Arc::new(ComposeStack::new(
        config.pipeline.compose_file.clone(),
        runner.clone(),
        Duration::from_secs(5),
    ));
    let inspector = Arc::new(InspectorService::new(&config, runner));
    let collaborators = Arc::new(CollaboratorSet::build(&config, stack, inspector));

    let api_state = ApiState {
        shared: state.clone(),
        config: store.clone(),
        collaborators,
        assets_dir: "does-not-exist".into(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown_tx, _) = broadcast::channel(1);
    tokio::spawn(serve_on(listener, api_state, shutdown_tx.clone()));

    TestApi {
        base,
        _config_file: config_file,
        _shutdown_tx: shutdown_tx,
        store,
        state,
    }
}

#[tokio::test]
async fn test_status_returns_shared_state() {
    let api = start_api().await;
    api.state.counters.add_processed(7);

    let response = reqwest::get(format!("{}/api/status", api.base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["events_processed"], 7);
    assert_eq!(body["aws_ready"], false);
    assert_eq!(
        body["opensearch_endpoint"],
        "https://demo.cluster.example:443"
    );
}

#[tokio::test]
async fn test_start_unknown_service_is_rejected() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/control/start", api.base))
        .json(&serde_json::json!({ "service": "ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "status": "error", "message": "Unknown service: ghost" })
    );
}

#[tokio::test]
async fn test_start_requires_service_name() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/control/start", api.base))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Service name not provided");
}

#[tokio::test]
async fn test_double_start_is_idempotent_success() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/control/start", api.base))
            .json(&serde_json::json!({ "service": "vector" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "success");
    }
}

#[tokio::test]
async fn test_stop_known_service_succeeds() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/control/stop", api.base))
        .json(&serde_json::json!({ "service": "suricata" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_config_endpoint_hides_secrets() {
    let api = start_api().await;
    let response = reqwest::get(format!("{}/api/config", api.base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("credentials").is_none());
    assert_eq!(body["telemetry"]["port"], 9100);
}

#[tokio::test]
async fn test_config_update_applies_whitelisted_patch() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/config/update", api.base))
        .json(&serde_json::json!({ "resources": { "max_ram_percent": 75.0 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(api.store.get().resources.max_ram_percent, 75.0);
}

#[tokio::test]
async fn test_config_update_rejects_unknown_key() {
    let api = start_api().await;
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/config/update", api.base))
        .json(&serde_json::json!({ "api": { "port": 9 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_dashboard_serves_fallback_without_assets() {
    let api = start_api().await;
    let response = reqwest::get(format!("{}/", api.base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("IDS2 SOC Pipeline"));
}

use async_trait::async_trait;
use ids2_agent::config::Config;
use ids2_agent::core::collaborators::command::{CommandOutput, CommandRunner};
use ids2_agent::core::collaborators::compose::{parse_ps_running, ComposeService, ComposeStack};
use ids2_agent::core::collaborators::inspector::{render_inspector_config, InspectorService};
use ids2_agent::core::collaborators::shipper::{render_shipper_config, validate_shipper_config};
use ids2_agent::core::collaborators::snapshot::SnapshotWorkflow;
use ids2_agent::core::collaborators::Collaborator;
use ids2_agent::core::AgentError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Script = Box<dyn Fn(&str, &[&str]) -> Result<CommandOutput, AgentError> + Send + Sync>;

/// A scripted stand-in for the process runner; records every invocation.
struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    script: Script,
}

impl ScriptedRunner {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            script,
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<CommandOutput, AgentError> {
        self.calls
            .lock()
            .push(format!("{program} {}", args.join(" ")));
        (self.script)(program, args)
    }
}

fn ok(stdout: &str) -> Result<CommandOutput, AgentError> {
    Ok(CommandOutput {
        status: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

fn failed(stderr: &str) -> Result<CommandOutput, AgentError> {
    Ok(CommandOutput {
        status: 1,
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

const RUNNING_PS: &str = r#"{"Name":"ids2-vector-1","Service":"vector","State":"running"}"#;
const EXITED_PS: &str = r#"{"Name":"ids2-vector-1","Service":"vector","State":"exited"}"#;

#[test]
fn test_parse_ps_output() {
    assert!(parse_ps_running(RUNNING_PS));
    assert!(!parse_ps_running(EXITED_PS));
    assert!(!parse_ps_running(""));
    assert!(!parse_ps_running("not json at all"));
    // Multi-line output with one running entry.
    let multi = format!("{EXITED_PS}\n{RUNNING_PS}\n");
    assert!(parse_ps_running(&multi));
}

fn stack_with(runner: Arc<ScriptedRunner>) -> Arc<ComposeStack> {
    Arc::new(ComposeStack::new(
        "docker-compose.yml".into(),
        runner,
        Duration::from_secs(5),
    ))
}

#[tokio::test]
async fn test_compose_service_start_is_idempotent() {
    let runner = ScriptedRunner::new(Box::new(|_, _| ok("")));
    let service = ComposeService::new("vector".to_string(), stack_with(runner.clone()));

    service.start().await.unwrap();
    service.start().await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].contains("up -d vector"));
    assert!(calls[1].contains("up -d vector"));
}

#[tokio::test]
async fn test_compose_service_is_running() {
    let runner = ScriptedRunner::new(Box::new(|_, args| {
        if args.contains(&"ps") {
            ok(RUNNING_PS)
        } else {
            ok("")
        }
    }));
    let service = ComposeService::new("vector".to_string(), stack_with(runner));
    assert!(service.is_running().await.unwrap());
}

#[tokio::test]
async fn test_compose_service_stop_failure_maps_to_collaborator_error() {
    let runner = ScriptedRunner::new(Box::new(|_, _| failed("no such service")));
    let service = ComposeService::new("ghost".to_string(), stack_with(runner));
    let err = service.stop().await.unwrap_err();
    match err {
        AgentError::CollaboratorFailed { name, .. } => assert_eq!(name, "ghost"),
        other => panic!("expected CollaboratorFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subprocess_timeout_propagates() {
    let runner = ScriptedRunner::new(Box::new(|program, args| {
        Err(AgentError::SubprocessTimeout {
            command: format!("{program} {}", args.join(" ")),
            seconds: 5,
        })
    }));
    let service = ComposeService::new("vector".to_string(), stack_with(runner));
    let err = service.start().await.unwrap_err();
    assert!(matches!(err, AgentError::SubprocessTimeout { .. }));
}

#[tokio::test]
async fn test_wait_until_healthy_times_out() {
    let runner = ScriptedRunner::new(Box::new(|_, _| ok(EXITED_PS)));
    let service = ComposeService::new("vector".to_string(), stack_with(runner));
    let err = service.wait_until_healthy(Duration::ZERO).await.unwrap_err();
    assert!(matches!(err, AgentError::CollaboratorFailed { .. }));
}

#[tokio::test]
async fn test_inspector_is_running_via_service_manager() {
    let runner = ScriptedRunner::new(Box::new(|program, _args| {
        assert_eq!(program, "systemctl");
        ok("")
    }));
    let config = Config::default();
    let inspector = InspectorService::new(&config, runner.clone());
    assert_eq!(inspector.name(), "suricata");
    assert!(inspector.is_running().await.unwrap());
    assert!(runner.calls()[0].contains("is-active"));
}

#[test]
fn test_inspector_config_renders_as_yaml() {
    let config = Config::default();
    let rendered = render_inspector_config(&config);
    let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
    assert_eq!(
        parsed["af-packet"][0]["interface"],
        serde_yaml::Value::String("eth0".to_string())
    );
    assert!(rendered.contains("/mnt/ram_logs/eve.json"));
}

#[test]
fn test_shipper_config_renders_as_toml() {
    let mut config = Config::default();
    config.remote.endpoint = Some("https://demo.cluster.example:443".to_string());
    let rendered = render_shipper_config(&config);
    validate_shipper_config(&rendered).unwrap();
    assert!(rendered.contains("https://demo.cluster.example:443"));
    assert!(rendered.contains("redis_fallback"));
    assert!(rendered.contains("ids2-logs-%Y.%m.%d"));
}

#[test]
fn test_shipper_validation_rejects_garbage() {
    assert!(validate_shipper_config("= not toml =").is_err());
}

fn snapshot_with(runner: Arc<ScriptedRunner>) -> SnapshotWorkflow {
    let config = Config::default();
    SnapshotWorkflow::new(&config.snapshot, runner, Duration::from_secs(5))
}

#[tokio::test]
async fn test_snapshot_skips_outside_a_repository() {
    let runner = ScriptedRunner::new(Box::new(|_, args| {
        if args.contains(&"rev-parse") {
            failed("not a git repository")
        } else {
            ok("")
        }
    }));
    let snapshot = snapshot_with(runner.clone());
    assert!(!snapshot.commit_and_push().await.unwrap());
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_snapshot_skips_clean_tree() {
    let runner = ScriptedRunner::new(Box::new(|_, args| {
        if args.contains(&"status") {
            ok("")
        } else {
            ok("true")
        }
    }));
    let snapshot = snapshot_with(runner.clone());
    assert!(!snapshot.commit_and_push().await.unwrap());
    let calls = runner.calls();
    assert!(!calls.iter().any(|c| c.contains("commit")));
}

#[tokio::test]
async fn test_snapshot_commits_and_pushes_pending_changes() {
    let runner = ScriptedRunner::new(Box::new(|_, args| {
        if args.contains(&"status") {
            ok(" M vector/vector.toml\n")
        } else {
            ok("true")
        }
    }));
    let snapshot = snapshot_with(runner.clone());
    assert!(snapshot.commit_and_push().await.unwrap());
    let calls = runner.calls();
    assert!(calls.iter().any(|c| c.contains("add -A")));
    assert!(calls.iter().any(|c| c.contains("commit -m")));
    assert!(calls.iter().any(|c| c.contains("push origin dev")));
}

#[tokio::test]
async fn test_snapshot_push_failure_is_version_control_error() {
    let runner = ScriptedRunner::new(Box::new(|_, args| {
        if args.contains(&"push") {
            failed("remote rejected")
        } else if args.contains(&"status") {
            ok(" M config.yaml\n")
        } else {
            ok("true")
        }
    }));
    let snapshot = snapshot_with(runner);
    let err = snapshot.commit_and_push().await.unwrap_err();
    assert!(matches!(err, AgentError::VersionControlFailed(_)));
}

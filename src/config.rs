// src/config.rs

//! Manages agent configuration: loading, secret resolution, and validation.
//!
//! The configuration is loaded once from a YAML file (default `config.yaml`),
//! passed through a generic `ENV:NAME` placeholder-resolution pass, then
//! deserialized into typed sections and validated. After that it is immutable
//! except for two narrow mutators on [`ConfigStore`]: `set_endpoint` (written
//! back after remote-cluster discovery) and `apply_patch` (control API).

use crate::core::errors::AgentError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Prefix marking a configuration string that must be resolved from the environment.
const ENV_PLACEHOLDER_PREFIX: &str = "ENV:";

/// Host identity of the single-board computer the agent runs on.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HostConfig {
    #[serde(default = "default_network_interface")]
    pub network_interface: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            network_interface: default_network_interface(),
        }
    }
}

fn default_network_interface() -> String {
    "eth0".to_string()
}

/// Resource ceilings and the three throttle thresholds (T1 < T2 < T3).
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ResourceConfig {
    #[serde(default = "default_max_cpu_percent")]
    pub max_cpu_percent: f64,
    #[serde(default = "default_max_ram_percent")]
    pub max_ram_percent: f64,
    #[serde(default = "default_throttle_threshold_1")]
    pub throttle_threshold_1: f64,
    #[serde(default = "default_throttle_threshold_2")]
    pub throttle_threshold_2: f64,
    #[serde(default = "default_throttle_threshold_3")]
    pub throttle_threshold_3: f64,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            max_cpu_percent: default_max_cpu_percent(),
            max_ram_percent: default_max_ram_percent(),
            throttle_threshold_1: default_throttle_threshold_1(),
            throttle_threshold_2: default_throttle_threshold_2(),
            throttle_threshold_3: default_throttle_threshold_3(),
        }
    }
}

fn default_max_cpu_percent() -> f64 {
    70.0
}
fn default_max_ram_percent() -> f64 {
    70.0
}
fn default_throttle_threshold_1() -> f64 {
    50.0
}
fn default_throttle_threshold_2() -> f64 {
    60.0
}
fn default_throttle_threshold_3() -> f64 {
    70.0
}

/// Identity of the remote search cluster and its bulk-ingest settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Cluster identifier for the management API. When unset, the configured
    /// `endpoint` is used as-is and discovery is skipped.
    #[serde(default)]
    pub domain: Option<String>,
    /// Ingest endpoint URL. Discovered during remote verification when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    #[serde(default = "default_bulk_size")]
    pub bulk_size: usize,
    #[serde(with = "humantime_serde", default = "default_bulk_timeout")]
    pub bulk_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            profile: default_profile(),
            domain: None,
            endpoint: None,
            index_prefix: default_index_prefix(),
            bulk_size: default_bulk_size(),
            bulk_timeout: default_bulk_timeout(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_profile() -> String {
    "default".to_string()
}
fn default_index_prefix() -> String {
    "ids2-logs".to_string()
}
fn default_bulk_size() -> usize {
    100
}
fn default_bulk_timeout() -> Duration {
    Duration::from_secs(30)
}

/// The local pipeline: compose file, inspector event log, and side-buffer.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_compose_file")]
    pub compose_file: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_sidebuffer_url")]
    pub sidebuffer_url: String,
    #[serde(default = "default_buffer_max_bytes")]
    pub buffer_max_bytes: u64,
    /// Service names declared in the compose file, in bring-up order.
    #[serde(default = "default_services")]
    pub services: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compose_file: default_compose_file(),
            log_file: default_log_file(),
            sidebuffer_url: default_sidebuffer_url(),
            buffer_max_bytes: default_buffer_max_bytes(),
            services: default_services(),
        }
    }
}

fn default_compose_file() -> PathBuf {
    PathBuf::from("docker/docker-compose.yml")
}
fn default_log_file() -> PathBuf {
    PathBuf::from("/mnt/ram_logs/eve.json")
}
fn default_sidebuffer_url() -> String {
    "redis://redis:6379/0".to_string()
}
fn default_buffer_max_bytes() -> u64 {
    256 * 1024 * 1024
}
fn default_services() -> Vec<String> {
    vec!["vector".to_string(), "redis".to_string()]
}

/// Packet-inspector (Suricata) settings used when rendering its configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InspectorConfig {
    #[serde(default = "default_inspector_config_file")]
    pub config_file: PathBuf,
    #[serde(default = "default_home_net")]
    pub home_net: String,
    #[serde(default = "default_external_net")]
    pub external_net: String,
    #[serde(default = "default_rule_files")]
    pub rule_files: Vec<String>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            config_file: default_inspector_config_file(),
            home_net: default_home_net(),
            external_net: default_external_net(),
            rule_files: default_rule_files(),
        }
    }
}

fn default_inspector_config_file() -> PathBuf {
    PathBuf::from("suricata/suricata.yaml")
}
fn default_home_net() -> String {
    "192.168.178.0/24".to_string()
}
fn default_external_net() -> String {
    "!$HOME_NET".to_string()
}
fn default_rule_files() -> Vec<String> {
    vec!["/etc/suricata/rules/suricata.rules".to_string()]
}

/// Log-shipper (Vector) settings used when rendering its configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ShipperConfig {
    #[serde(default = "default_shipper_config_file")]
    pub config_file: PathBuf,
    #[serde(default = "default_buffer_dir")]
    pub buffer_dir: PathBuf,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            config_file: default_shipper_config_file(),
            buffer_dir: default_buffer_dir(),
        }
    }
}

fn default_shipper_config_file() -> PathBuf {
    PathBuf::from("vector/vector.toml")
}
fn default_buffer_dir() -> PathBuf {
    PathBuf::from("/var/lib/vector/buffer")
}

/// Configuration for the Prometheus telemetry exporter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_port")]
    pub port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            port: default_telemetry_port(),
        }
    }
}

fn default_telemetry_port() -> u16 {
    9100
}

/// Configuration for the operator-facing control API.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}
fn default_api_port() -> u16 {
    5000
}
fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

/// Feature flags.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub pull_images: bool,
    #[serde(default = "default_true")]
    pub snapshot: bool,
    #[serde(default = "default_true")]
    pub reclaim_memory: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            pull_images: true,
            snapshot: true,
            reclaim_memory: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Deadlines and timeouts, expressed as humantime strings in the file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct TimeoutsConfig {
    #[serde(with = "humantime_serde", default = "default_dns_probe")]
    pub dns_probe: Duration,
    #[serde(with = "humantime_serde", default = "default_tls_probe")]
    pub tls_probe: Duration,
    #[serde(with = "humantime_serde", default = "default_stack_health")]
    pub stack_health: Duration,
    #[serde(with = "humantime_serde", default = "default_connectivity_wait")]
    pub connectivity_wait: Duration,
    #[serde(with = "humantime_serde", default = "default_connectivity_poll")]
    pub connectivity_poll: Duration,
    #[serde(with = "humantime_serde", default = "default_subprocess")]
    pub subprocess: Duration,
    #[serde(with = "humantime_serde", default = "default_worker_stop")]
    pub worker_stop: Duration,
    #[serde(with = "humantime_serde", default = "default_api_stop")]
    pub api_stop: Duration,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            dns_probe: default_dns_probe(),
            tls_probe: default_tls_probe(),
            stack_health: default_stack_health(),
            connectivity_wait: default_connectivity_wait(),
            connectivity_poll: default_connectivity_poll(),
            subprocess: default_subprocess(),
            worker_stop: default_worker_stop(),
            api_stop: default_api_stop(),
        }
    }
}

fn default_dns_probe() -> Duration {
    Duration::from_secs(10)
}
fn default_tls_probe() -> Duration {
    Duration::from_secs(10)
}
fn default_stack_health() -> Duration {
    Duration::from_secs(120)
}
fn default_connectivity_wait() -> Duration {
    Duration::from_secs(120)
}
fn default_connectivity_poll() -> Duration {
    Duration::from_secs(10)
}
fn default_subprocess() -> Duration {
    Duration::from_secs(60)
}
fn default_worker_stop() -> Duration {
    Duration::from_secs(5)
}
fn default_api_stop() -> Duration {
    Duration::from_secs(10)
}

/// Retry policy for the bulk-ingest probe.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct RetryConfig {
    #[serde(default = "default_bulk_attempts")]
    pub bulk_attempts: u32,
    #[serde(with = "humantime_serde", default = "default_backoff_min")]
    pub backoff_min: Duration,
    #[serde(with = "humantime_serde", default = "default_backoff_max")]
    pub backoff_max: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            bulk_attempts: default_bulk_attempts(),
            backoff_min: default_backoff_min(),
            backoff_max: default_backoff_max(),
        }
    }
}

fn default_bulk_attempts() -> u32 {
    3
}
fn default_backoff_min() -> Duration {
    Duration::from_secs(2)
}
fn default_backoff_max() -> Duration {
    Duration::from_secs(10)
}

/// Versioned-snapshot (git) settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_remote")]
    pub remote: String,
    #[serde(default = "default_snapshot_branch")]
    pub branch: String,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            remote: default_snapshot_remote(),
            branch: default_snapshot_branch(),
            commit_message: default_commit_message(),
        }
    }
}

fn default_snapshot_remote() -> String {
    "origin".to_string()
}
fn default_snapshot_branch() -> String {
    "dev".to_string()
}
fn default_commit_message() -> String {
    "chore(dev): agent bootstrap - pipeline configs regenerated".to_string()
}

/// Secrets, expected to be `ENV:NAME` placeholders in the file. Resolved at
/// load time; never serialized back out.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub master_user: Option<String>,
    #[serde(default)]
    pub master_pass: Option<String>,
}

/// The final, resolved, and validated agent configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub inspector: InspectorConfig,
    #[serde(default)]
    pub shipper: ShipperConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default, skip_serializing)]
    pub credentials: CredentialsConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Walks a YAML value tree and replaces every `ENV:NAME` string with the
/// value of the environment variable `NAME`. An unset or empty variable
/// fails the whole load.
fn resolve_placeholders(value: &mut serde_yaml::Value) -> Result<(), AgentError> {
    match value {
        serde_yaml::Value::String(s) => {
            if let Some(name) = s.strip_prefix(ENV_PLACEHOLDER_PREFIX) {
                let resolved = std::env::var(name).unwrap_or_default();
                if resolved.is_empty() {
                    return Err(AgentError::MissingSecret(name.to_string()));
                }
                *s = resolved;
            }
        }
        serde_yaml::Value::Sequence(seq) => {
            for item in seq {
                resolve_placeholders(item)?;
            }
        }
        serde_yaml::Value::Mapping(map) => {
            for (_, item) in map.iter_mut() {
                resolve_placeholders(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

impl Config {
    /// Creates a `Config` by reading and parsing a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AgentError::ConfigInvalid(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses, resolves secrets, and validates a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, AgentError> {
        let mut doc: serde_yaml::Value = serde_yaml::from_str(contents)
            .map_err(|e| AgentError::ConfigInvalid(format!("failed to parse YAML: {e}")))?;
        resolve_placeholders(&mut doc)?;
        let config: Config = serde_yaml::from_value(doc)
            .map_err(|e| AgentError::ConfigInvalid(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the resolved configuration for logical consistency.
    pub fn validate(&self) -> Result<(), AgentError> {
        let r = &self.resources;
        for (label, v) in [
            ("resources.max_cpu_percent", r.max_cpu_percent),
            ("resources.max_ram_percent", r.max_ram_percent),
        ] {
            if !(0.0..=100.0).contains(&v) || v == 0.0 {
                return Err(AgentError::ConfigInvalid(format!(
                    "{label} must be within (0, 100], got {v}"
                )));
            }
        }
        if !(r.throttle_threshold_1 < r.throttle_threshold_2
            && r.throttle_threshold_2 < r.throttle_threshold_3)
        {
            return Err(AgentError::ConfigInvalid(format!(
                "throttle thresholds must be strictly increasing, got {} / {} / {}",
                r.throttle_threshold_1, r.throttle_threshold_2, r.throttle_threshold_3
            )));
        }
        if r.throttle_threshold_1 <= 0.0 {
            return Err(AgentError::ConfigInvalid(
                "resources.throttle_threshold_1 must be positive".to_string(),
            ));
        }

        if self.telemetry.port == 0 {
            return Err(AgentError::ConfigInvalid(
                "telemetry.port cannot be 0".to_string(),
            ));
        }
        if self.api.port == 0 {
            return Err(AgentError::ConfigInvalid("api.port cannot be 0".to_string()));
        }
        if self.telemetry.port == self.api.port {
            return Err(AgentError::ConfigInvalid(
                "telemetry.port cannot be the same as api.port".to_string(),
            ));
        }

        if let Some(endpoint) = &self.remote.endpoint {
            Url::parse(endpoint).map_err(|e| {
                AgentError::ConfigInvalid(format!("remote.endpoint '{endpoint}' is not a URL: {e}"))
            })?;
        }
        if self.remote.bulk_size == 0 {
            return Err(AgentError::ConfigInvalid(
                "remote.bulk_size cannot be 0".to_string(),
            ));
        }

        if self.pipeline.services.is_empty() {
            return Err(AgentError::ConfigInvalid(
                "pipeline.services cannot be empty".to_string(),
            ));
        }

        if self.retry.bulk_attempts == 0 {
            return Err(AgentError::ConfigInvalid(
                "retry.bulk_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration keys the control API may patch at runtime.
const MUTABLE_KEYS: &[&str] = &[
    "resources.max_cpu_percent",
    "resources.max_ram_percent",
    "resources.throttle_threshold_1",
    "resources.throttle_threshold_2",
    "resources.throttle_threshold_3",
    "features.pull_images",
    "features.snapshot",
    "features.reclaim_memory",
];

/// Owns the on-disk configuration file and the current in-memory copy.
///
/// The two mutators rewrite the file in place, editing the raw YAML value
/// tree so unrelated keys (including unresolved `ENV:` placeholders) are
/// preserved byte-for-byte in meaning.
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Config>,
}

impl ConfigStore {
    /// Loads the configuration from `path` and takes ownership of the file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AgentError> {
        let path = path.into();
        let config = Config::from_file(&path)?;
        info!("Configuration loaded from {}", path.display());
        Ok(Self {
            path,
            current: RwLock::new(config),
        })
    }

    /// Returns a clone of the current configuration.
    pub fn get(&self) -> Config {
        self.current.read().clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets `remote.endpoint` in memory and in the on-disk file.
    ///
    /// This is the single post-load mutation performed by the supervisor after
    /// remote-cluster discovery.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<(), AgentError> {
        self.rewrite_file(|doc| {
            set_nested(
                doc,
                &["remote", "endpoint"],
                serde_yaml::Value::String(endpoint.to_string()),
            );
        })?;
        self.current.write().remote.endpoint = Some(endpoint.to_string());
        info!(
            "Remote endpoint updated to {endpoint} in {}",
            self.path.display()
        );
        Ok(())
    }

    /// Validates and applies a JSON patch of runtime-mutable keys, then
    /// persists it. Returns the dotted paths that were applied.
    pub fn apply_patch(&self, patch: &serde_json::Value) -> Result<Vec<String>, AgentError> {
        let mut entries = Vec::new();
        flatten_patch("", patch, &mut entries)?;
        if entries.is_empty() {
            return Err(AgentError::ConfigInvalid(
                "empty configuration patch".to_string(),
            ));
        }
        for (path, _) in &entries {
            if !MUTABLE_KEYS.contains(&path.as_str()) {
                return Err(AgentError::ConfigInvalid(format!(
                    "'{path}' is not updatable at runtime"
                )));
            }
        }

        // Apply to a candidate copy first so a bad patch never lands anywhere.
        let current = self.get();
        let mut candidate_doc = serde_yaml::to_value(&current)
            .map_err(|e| AgentError::ConfigInvalid(format!("serialization failed: {e}")))?;
        for (path, value) in &entries {
            let segments: Vec<&str> = path.split('.').collect();
            let yaml_value = serde_yaml::to_value(value)
                .map_err(|e| AgentError::ConfigInvalid(format!("invalid value for '{path}': {e}")))?;
            set_nested(&mut candidate_doc, &segments, yaml_value);
        }
        let mut candidate: Config = serde_yaml::from_value(candidate_doc)
            .map_err(|e| AgentError::ConfigInvalid(format!("patch produced invalid config: {e}")))?;
        // Credentials are never serialized, so carry them over from the
        // current config instead of resetting them.
        candidate.credentials = current.credentials.clone();
        candidate.validate()?;

        self.rewrite_file(|doc| {
            for (path, value) in &entries {
                let segments: Vec<&str> = path.split('.').collect();
                if let Ok(yaml_value) = serde_yaml::to_value(value) {
                    set_nested(doc, &segments, yaml_value);
                }
            }
        })?;

        let applied = entries.into_iter().map(|(p, _)| p).collect();
        *self.current.write() = candidate;
        Ok(applied)
    }

    /// Rewrites the on-disk file through an edit of its raw YAML value tree.
    fn rewrite_file(&self, edit: impl FnOnce(&mut serde_yaml::Value)) -> Result<(), AgentError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AgentError::ConfigInvalid(format!(
                "failed to read config file '{}': {e}",
                self.path.display()
            ))
        })?;
        let mut doc: serde_yaml::Value = serde_yaml::from_str(&contents)
            .map_err(|e| AgentError::ConfigInvalid(format!("failed to parse YAML: {e}")))?;
        edit(&mut doc);
        let rendered = serde_yaml::to_string(&doc)
            .map_err(|e| AgentError::ConfigInvalid(format!("failed to render YAML: {e}")))?;
        fs::write(&self.path, rendered)?;
        Ok(())
    }
}

/// Inserts `value` at the nested `path`, creating intermediate mappings.
fn set_nested(doc: &mut serde_yaml::Value, path: &[&str], value: serde_yaml::Value) {
    if path.is_empty() {
        *doc = value;
        return;
    }
    if !matches!(doc, serde_yaml::Value::Mapping(_)) {
        *doc = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
    }
    let serde_yaml::Value::Mapping(map) = doc else {
        return;
    };
    let key = serde_yaml::Value::String(path[0].to_string());
    if path.len() == 1 {
        map.insert(key, value);
        return;
    }
    let entry = map
        .entry(key)
        .or_insert_with(|| serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
    set_nested(entry, &path[1..], value);
}

/// Flattens a nested JSON object into dotted leaf paths.
fn flatten_patch(
    prefix: &str,
    value: &serde_json::Value,
    out: &mut Vec<(String, serde_json::Value)>,
) -> Result<(), AgentError> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, item) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_patch(&path, item, out)?;
            }
            Ok(())
        }
        serde_json::Value::Null => Err(AgentError::ConfigInvalid(format!(
            "null is not a valid value for '{prefix}'"
        ))),
        _ if prefix.is_empty() => Err(AgentError::ConfigInvalid(
            "configuration patch must be a JSON object".to_string(),
        )),
        _ => {
            out.push((prefix.to_string(), value.clone()));
            Ok(())
        }
    }
}

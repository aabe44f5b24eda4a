// src/core/collaborators/shipper.rs

//! Log-shipper (Vector) configuration rendering and validation.
//!
//! The shipper itself runs as a compose service; this module only owns the
//! mechanical templating of its configuration: tail the inspector's eve log,
//! reshape events into the common observability layout, and ship them to the
//! remote cluster's bulk API with a disk buffer and a declared side-buffer
//! sink for outages.

use crate::config::Config;
use crate::core::errors::AgentError;
use tracing::info;

/// Renders the shipper TOML from the loaded agent config.
pub fn render_shipper_config(config: &Config) -> String {
    let endpoint = config.remote.endpoint.clone().unwrap_or_default();
    format!(
        r#"# Shipper configuration, rendered by ids2-agent. Do not edit manually.

data_dir = "/var/lib/vector"

[sources.eve]
type = "file"
include = ["{log_file}"]
read_from = "beginning"

[transforms.to_ecs]
type = "remap"
inputs = ["eve"]
source = '''
. = parse_json!(string!(.message))
."@timestamp" = .timestamp
.ecs.version = "8.11.0"
.event.module = "ids2"
.event.dataset = "suricata.eve"
.event.kind = "alert"
del(.timestamp)
'''

[sinks.opensearch]
type = "elasticsearch"
inputs = ["to_ecs"]
endpoints = ["{endpoint}"]
mode = "bulk"
bulk.index = "{index_prefix}-%Y.%m.%d"
batch.max_events = {bulk_size}
batch.timeout_secs = {bulk_timeout}
buffer.type = "disk"
buffer.max_size = {buffer_max_bytes}
buffer.when_full = "block"

[sinks.redis_fallback]
type = "redis"
inputs = ["to_ecs"]
url = "{sidebuffer_url}"
key = "{index_prefix}-fallback"
data_type = "list"
encoding.codec = "json"
"#,
        log_file = config.pipeline.log_file.display(),
        endpoint = endpoint,
        index_prefix = config.remote.index_prefix,
        bulk_size = config.remote.bulk_size,
        bulk_timeout = config.remote.bulk_timeout.as_secs(),
        buffer_max_bytes = config.pipeline.buffer_max_bytes,
        sidebuffer_url = config.pipeline.sidebuffer_url,
    )
}

/// Syntactic validation: the rendered document must re-parse as TOML.
pub fn validate_shipper_config(rendered: &str) -> Result<(), AgentError> {
    toml::from_str::<toml::Value>(rendered).map_err(|e| {
        AgentError::collaborator("vector", format!("rendered config is not TOML: {e}"))
    })?;
    Ok(())
}

/// Renders, validates, and writes the shipper configuration file.
pub async fn generate_shipper_config(config: &Config) -> Result<(), AgentError> {
    let rendered = render_shipper_config(config);
    validate_shipper_config(&rendered)?;
    let path = &config.shipper.config_file;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, rendered).await?;
    info!("Shipper configuration written to {}", path.display());
    Ok(())
}

// src/core/remote/ecs.rs

//! ECS-shaped event documents and the ndjson bulk body for the ingest API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

/// ECS schema version stamped on every document.
const ECS_VERSION: &str = "8.11.0";

#[derive(Debug, Clone, Serialize)]
pub struct EcsMeta {
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventMeta {
    pub kind: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind_type: String,
    pub dataset: String,
    pub module: String,
    pub severity: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkEndpoint {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkMeta {
    pub protocol: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleMeta {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentMeta {
    #[serde(rename = "type")]
    pub agent_type: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostMeta {
    pub hostname: String,
    pub architecture: &'static str,
}

/// An event document following the common observability field layout.
#[derive(Debug, Clone, Serialize)]
pub struct EcsEvent {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub ecs: EcsMeta,
    pub event: EventMeta,
    pub source: NetworkEndpoint,
    pub destination: NetworkEndpoint,
    pub network: NetworkMeta,
    pub rule: RuleMeta,
    pub agent: AgentMeta,
    pub host: HostMeta,
}

impl EcsEvent {
    /// The minimal synthetic document the connectivity prober ingests.
    pub fn probe(now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ecs: EcsMeta {
                version: ECS_VERSION,
            },
            event: EventMeta {
                kind: "event".to_string(),
                category: "network".to_string(),
                kind_type: "info".to_string(),
                dataset: "ids2.connectivity".to_string(),
                module: "ids2".to_string(),
                severity: 0,
            },
            source: NetworkEndpoint {
                ip: "127.0.0.1".to_string(),
                port: 0,
            },
            destination: NetworkEndpoint {
                ip: "127.0.0.1".to_string(),
                port: 443,
            },
            network: NetworkMeta {
                protocol: "https".to_string(),
            },
            rule: RuleMeta {
                name: "connectivity-probe".to_string(),
                id: "0".to_string(),
            },
            agent: AgentMeta {
                agent_type: "ids2-agent",
                version: env!("CARGO_PKG_VERSION"),
            },
            host: HostMeta {
                hostname: sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string()),
                architecture: std::env::consts::ARCH,
            },
        }
    }
}

/// Daily index name: `{prefix}-YYYY.MM.DD`.
pub fn daily_index(prefix: &str, when: DateTime<Utc>) -> String {
    format!("{prefix}-{}", when.format("%Y.%m.%d"))
}

/// Builds the alternating action/source ndjson bulk body. Every line,
/// including the last, is newline-terminated as the ingest API requires.
pub fn bulk_body<T: Serialize>(index: &str, docs: &[T]) -> String {
    let mut body = String::new();
    let action = json!({ "index": { "_index": index } });
    for doc in docs {
        body.push_str(&action.to_string());
        body.push('\n');
        if let Ok(source) = serde_json::to_string(doc) {
            body.push_str(&source);
        }
        body.push('\n');
    }
    body
}

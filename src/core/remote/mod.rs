// src/core/remote/mod.rs

//! Client for the remote search cluster: credential verification and domain
//! discovery over the SigV4-signed management APIs, and the bulk-ingest probe.

pub mod ecs;
pub mod sigv4;

use crate::config::Config;
use crate::core::errors::AgentError;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Per-request deadline for the management API calls.
const MANAGEMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// The subset of the describe-domain response the supervisor inspects.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainStatus {
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub processing: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl DomainStatus {
    /// A domain is usable when fully created, not mid-change, and addressable.
    pub fn is_ready(&self) -> bool {
        self.created && !self.deleted && !self.processing && self.endpoint.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeDomainResponse {
    domain_status: DomainStatus,
}

/// Outcome of a single bulk-probe attempt. Transport-level failures are
/// returned as `Err` and are the only retryable case.
#[derive(Debug)]
pub enum BulkOutcome {
    /// HTTP 200/201. `item_errors` mirrors the response's `errors` field;
    /// it does not demote the probe below transport success.
    Accepted {
        latency: Duration,
        item_errors: bool,
    },
    /// A definitive HTTP rejection (auth, mapping, routing). Not retried.
    Rejected { status: u16 },
}

/// Talks to the remote cluster's management and ingest APIs.
pub struct RemoteClusterClient {
    http: reqwest::Client,
    region: String,
    access_key: String,
    secret_key: String,
    master_user: Option<String>,
    master_pass: Option<String>,
    index_prefix: String,
    bulk_timeout: Duration,
}

impl RemoteClusterClient {
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            region: config.remote.region.clone(),
            access_key: config.credentials.access_key.clone(),
            secret_key: config.credentials.secret_key.clone(),
            master_user: config.credentials.master_user.clone(),
            master_pass: config.credentials.master_pass.clone(),
            index_prefix: config.remote.index_prefix.clone(),
            bulk_timeout: config.remote.bulk_timeout,
        })
    }

    fn signing_key<'a>(&'a self, service: &'a str) -> sigv4::SigningKey<'a> {
        sigv4::SigningKey {
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region,
            service,
        }
    }

    /// Verifies the configured credentials against the token service.
    /// Returns the caller identity ARN for logging.
    pub async fn verify_credentials(&self) -> Result<String, AgentError> {
        let url = Url::parse(&format!("https://sts.{}.amazonaws.com/", self.region))
            .map_err(|e| AgentError::RemoteUnavailable(format!("bad STS URL: {e}")))?;
        let body = "Action=GetCallerIdentity&Version=2011-06-15";
        let content_type = "application/x-www-form-urlencoded";
        let signed = sigv4::sign(
            "POST",
            &url,
            Some(content_type),
            body.as_bytes(),
            &self.signing_key("sts"),
            Utc::now(),
        );

        let response = self
            .http
            .post(url)
            .timeout(MANAGEMENT_TIMEOUT)
            .header("content-type", content_type)
            .header("accept", "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::RemoteUnavailable(format!(
                "credential verification failed: HTTP {}",
                response.status().as_u16()
            )));
        }

        let payload: serde_json::Value = response.json().await?;
        let arn = payload["GetCallerIdentityResponse"]["GetCallerIdentityResult"]["Arn"]
            .as_str()
            .unwrap_or("unknown")
            .to_string();
        Ok(arn)
    }

    /// Fetches the management-API view of the named cluster.
    pub async fn describe_domain(&self, domain: &str) -> Result<DomainStatus, AgentError> {
        let url = Url::parse(&format!(
            "https://es.{}.amazonaws.com/2021-01-01/opensearch/domain/{domain}",
            self.region
        ))
        .map_err(|e| AgentError::RemoteUnavailable(format!("bad management URL: {e}")))?;
        let signed = sigv4::sign("GET", &url, None, b"", &self.signing_key("es"), Utc::now());

        let response = self
            .http
            .get(url)
            .timeout(MANAGEMENT_TIMEOUT)
            .header("accept", "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let described: DescribeDomainResponse = response.json().await?;
                Ok(described.domain_status)
            }
            StatusCode::NOT_FOUND => Err(AgentError::RemoteUnavailable(format!(
                "domain '{domain}' not found"
            ))),
            status => Err(AgentError::RemoteUnavailable(format!(
                "describe-domain for '{domain}' failed: HTTP {}",
                status.as_u16()
            ))),
        }
    }

    /// One bulk-probe attempt: a single ECS probe document posted to
    /// `{endpoint}/_bulk`. Transport errors surface as `Err` so the caller
    /// can apply the retry policy; HTTP rejections are final.
    pub async fn bulk_probe(&self, endpoint: &str) -> Result<BulkOutcome, AgentError> {
        let now = Utc::now();
        let index = ecs::daily_index(&self.index_prefix, now);
        let body = ecs::bulk_body(&index, &[ecs::EcsEvent::probe(now)]);
        let url = format!("{}/_bulk", endpoint.trim_end_matches('/'));

        let mut request = self
            .http
            .post(&url)
            .timeout(self.bulk_timeout)
            .header("content-type", "application/x-ndjson")
            .body(body);
        if let Some(user) = &self.master_user {
            request = request.basic_auth(user, self.master_pass.as_deref());
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let latency = started.elapsed();
            let item_errors = match response.json::<serde_json::Value>().await {
                Ok(payload) => payload["errors"].as_bool().unwrap_or(false),
                Err(e) => {
                    debug!("Bulk response body was not JSON: {e}");
                    false
                }
            };
            if item_errors {
                warn!("Bulk probe accepted at transport level but reported item errors");
            }
            Ok(BulkOutcome::Accepted {
                latency,
                item_errors,
            })
        } else {
            Ok(BulkOutcome::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

// src/core/remote/sigv4.rs

//! Minimal AWS Signature Version 4 request signing.
//!
//! Only what the management-API calls need: single-shot requests with a small
//! set of signed headers (`host`, `x-amz-date`, optionally `content-type`).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The credential scope a request is signed for.
pub struct SigningKey<'a> {
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Headers the caller must attach to the outgoing request.
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Canonical query string: pairs sorted by key then value, already-encoded
/// components passed through.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs a request and returns the headers to attach.
///
/// `content_type`, when present, is included in the signed header set and must
/// then be sent verbatim on the request.
pub fn sign(
    method: &str,
    url: &Url,
    content_type: Option<&str>,
    payload: &[u8],
    key: &SigningKey<'_>,
    when: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = when.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = when.format("%Y%m%d").to_string();
    let host = url.host_str().unwrap_or_default();

    let mut header_pairs: Vec<(String, String)> = Vec::new();
    if let Some(ct) = content_type {
        header_pairs.push(("content-type".to_string(), ct.to_string()));
    }
    header_pairs.push(("host".to_string(), host.to_string()));
    header_pairs.push(("x-amz-date".to_string(), amz_date.clone()));
    header_pairs.sort();

    let canonical_headers: String = header_pairs
        .iter()
        .map(|(k, v)| format!("{k}:{v}\n"))
        .collect();
    let signed_header_names = header_pairs
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_uri = if url.path().is_empty() { "/" } else { url.path() };
    let canonical_request = format!(
        "{method}\n{canonical_uri}\n{}\n{canonical_headers}\n{signed_header_names}\n{}",
        canonical_query(url),
        sha256_hex(payload),
    );

    let credential_scope = format!(
        "{date_stamp}/{}/{}/aws4_request",
        key.region, key.service
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical_request.as_bytes()),
    );

    let k_secret = format!("AWS4{}", key.secret_key);
    let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, key.region.as_bytes());
    let k_service = hmac_sha256(&k_region, key.service.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_header_names}, Signature={signature}",
        key.access_key,
    );

    SignedHeaders {
        authorization,
        amz_date,
    }
}

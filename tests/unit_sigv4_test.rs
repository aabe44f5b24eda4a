use chrono::{TimeZone, Utc};
use ids2_agent::core::remote::sigv4::{sign, SigningKey};
use url::Url;

// The reference `get-vanilla` case from the public signature test suite.
fn test_key() -> SigningKey<'static> {
    SigningKey {
        access_key: "AKIDEXAMPLE",
        secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        region: "us-east-1",
        service: "service",
    }
}

#[test]
fn test_get_vanilla_signature() {
    let url = Url::parse("https://example.amazonaws.com/").unwrap();
    let when = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();
    let signed = sign("GET", &url, None, b"", &test_key(), when);

    assert_eq!(signed.amz_date, "20150830T123600Z");
    assert!(signed
        .authorization
        .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request"));
    assert!(signed
        .authorization
        .contains("SignedHeaders=host;x-amz-date"));
    assert!(signed.authorization.ends_with(
        "Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    ));
}

#[test]
fn test_content_type_joins_signed_headers() {
    let url = Url::parse("https://sts.us-east-1.amazonaws.com/").unwrap();
    let when = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
    let signed = sign(
        "POST",
        &url,
        Some("application/x-www-form-urlencoded"),
        b"Action=GetCallerIdentity&Version=2011-06-15",
        &test_key(),
        when,
    );
    assert!(signed
        .authorization
        .contains("SignedHeaders=content-type;host;x-amz-date"));
}

#[test]
fn test_signature_depends_on_payload() {
    let url = Url::parse("https://example.amazonaws.com/").unwrap();
    let when = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
    let one = sign("POST", &url, None, b"a", &test_key(), when);
    let two = sign("POST", &url, None, b"b", &test_key(), when);
    assert_ne!(one.authorization, two.authorization);
}

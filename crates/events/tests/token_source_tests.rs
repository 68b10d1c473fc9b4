//! Service-account token exchange against a mock OAuth endpoint.

use assert_matches::assert_matches;
use jsonwebtoken::Algorithm;
use prana_events::delivery::token::{
    AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, TokenSourceError,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_FILE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/service_account.json"
);

fn source_against(server: &MockServer) -> ServiceAccountTokenSource {
    let mut key = ServiceAccountKey::from_file(KEY_FILE).unwrap();
    key.token_uri = format!("{}/token", server.uri());
    ServiceAccountTokenSource::new(key).unwrap()
}

#[test]
fn fixture_key_file_loads() {
    let key = ServiceAccountKey::from_file(KEY_FILE).unwrap();
    assert_eq!(key.project_id.as_deref(), Some("prana-g-test"));
    assert_eq!(
        key.client_email,
        "notifier@prana-g-test.iam.gserviceaccount.com"
    );
    assert!(ServiceAccountTokenSource::new(key).is_ok());
}

#[tokio::test]
async fn exchanges_a_signed_assertion_once_and_caches_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.mock",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = source_against(&server);
    assert_eq!(source.access_token().await.unwrap(), "ya29.mock");
    assert_eq!(source.access_token().await.unwrap(), "ya29.mock");
}

#[tokio::test]
async fn assertion_is_rs256_and_names_the_key_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.mock",
            "expires_in": 3599
        })))
        .mount(&server)
        .await;

    source_against(&server).access_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let assertion = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("assertion="))
        .expect("form carries an assertion");

    let header = jsonwebtoken::decode_header(assertion).unwrap();
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.kid.as_deref(), Some("0123456789abcdef"));
}

#[tokio::test]
async fn rejected_exchange_reports_status_and_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .expect(2)
        .mount(&server)
        .await;

    let source = source_against(&server);
    let first = source.access_token().await;
    assert_matches!(
        first,
        Err(TokenSourceError::HttpStatus { status: 400, ref body }) if body.contains("invalid_grant")
    );
    assert!(source.access_token().await.is_err());
}

//! Tests for the auth module

use super::*;
use crate::error::Error;
use base64::Engine;
use std::sync::Arc;
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("my-client", "my-secret", "alice", "hunter2", "rsnoo-test/0.1")
}

fn session(server: &MockServer) -> AuthSession {
    AuthSession::with_client(
        credentials(),
        format!("{}/api/v1/access_token", server.uri()),
        reqwest::Client::new(),
    )
}

fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
    serde_json::json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": expires_in,
        "scope": "*"
    })
}

#[tokio::test]
async fn test_password_grant_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(basic_auth("my-client", "my-secret"))
        .and(header("user-agent", "rsnoo-test/0.1"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server);
    let token = session.token().await.unwrap();

    assert_eq!(token.access_token, "tok-1");
    assert_eq!(token.token_type, "bearer");
    assert!(!token.is_expired());
    assert_eq!(session.refresh_count(), 1);
}

#[tokio::test]
async fn test_basic_auth_encoding() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", 3600)))
        .mount(&server)
        .await;

    session(&server).token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth_header = requests[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let encoded = auth_header.strip_prefix("Basic ").unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "my-client:my-secret");
}

#[tokio::test]
async fn test_headers_contain_token_and_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2", 3600)))
        .mount(&server)
        .await;

    let headers = session(&server).headers().await.unwrap();
    assert_eq!(headers.get("authorization").unwrap(), "bearer tok-2");
    assert_eq!(headers.get("user-agent").unwrap(), "rsnoo-test/0.1");
}

#[tokio::test]
async fn test_cached_token_is_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", 3600)))
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server);
    for _ in 0..5 {
        session.headers().await.unwrap();
    }
    assert_eq!(session.refresh_count(), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let server = MockServer::start().await;

    // Server hands out tokens that are already expired
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("short", 0)))
        .expect(2)
        .mount(&server)
        .await;

    let session = session(&server);
    session.token().await.unwrap();
    session.token().await.unwrap();
    assert_eq!(session.refresh_count(), 2);
}

#[tokio::test]
async fn test_invalidate_forces_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", 3600)))
        .expect(2)
        .mount(&server)
        .await;

    let session = session(&server);
    session.token().await.unwrap();
    session.invalidate().await;
    session.token().await.unwrap();
    assert_eq!(session.refresh_count(), 2);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("shared", 3600))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(session(&server));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.token().await })
        })
        .collect();

    for task in tasks {
        let token = task.await.unwrap().unwrap();
        assert_eq!(token.access_token, "shared");
    }
    assert_eq!(session.refresh_count(), 1);
}

#[tokio::test]
async fn test_non_200_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let err = session(&server).token().await.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_invalid_grant_payload_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let err = session(&server).token().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn test_malformed_token_response_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = session(&server).token().await.unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}

#[tokio::test]
async fn test_unreachable_token_endpoint_is_transport_error() {
    let session = AuthSession::with_client(
        credentials(),
        "http://127.0.0.1:1/api/v1/access_token",
        reqwest::Client::new(),
    );

    let err = session.token().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_retryable());
}

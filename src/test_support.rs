//! Shared fixtures for unit tests

use crate::auth::Credentials;
use crate::http::{HttpClient, HttpClientConfig, RateLimitConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) fn credentials() -> Credentials {
    Credentials::new("client", "secret", "alice", "hunter2", "rsnoo-test/0.1")
}

pub(crate) async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

pub(crate) fn client_config(server: &MockServer) -> HttpClientConfig {
    HttpClientConfig::builder()
        .api_base_url(server.uri())
        .token_url(format!("{}/api/v1/access_token", server.uri()))
        .rate_limit(RateLimitConfig::new(1.0, Duration::ZERO))
        .build()
}

pub(crate) async fn mock_client(server: &MockServer) -> Arc<HttpClient> {
    mount_token(server).await;
    Arc::new(HttpClient::with_config(client_config(server), credentials()).unwrap())
}

pub(crate) fn link(id: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "name": format!("t3_{id}"),
            "title": format!("Post {id}"),
            "author": "bob",
            "subreddit": "rust",
            "score": 1,
            "created_utc": 1_600_000_000.0
        }
    })
}

pub(crate) fn comment(id: &str, parent: &str, replies: Value) -> Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "name": format!("t1_{id}"),
            "body": format!("comment {id}"),
            "author": "carol",
            "link_id": "t3_post",
            "parent_id": parent,
            "subreddit": "rust",
            "score": 1,
            "replies": replies
        }
    })
}

pub(crate) fn more(id: &str, parent: &str, children: &[&str]) -> Value {
    json!({
        "kind": "more",
        "data": {
            "id": id,
            "name": format!("t1_{id}"),
            "parent_id": parent,
            "depth": 1,
            "count": children.len(),
            "children": children
        }
    })
}

pub(crate) fn listing(children: Vec<Value>) -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": null,
            "before": null,
            "children": children
        }
    })
}

pub(crate) fn more_children_response(things: Vec<Value>) -> Value {
    json!({
        "json": {
            "errors": [],
            "data": { "things": things }
        }
    })
}

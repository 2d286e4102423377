//! Tests for placeholder resolution

use super::*;
use crate::listing::{parse_submission, CommentForest};
use crate::models::{Item, MoreComments};
use crate::test_support::{comment, link, listing, mock_client, more, more_children_response};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn thread(comments: Vec<Value>) -> CommentForest {
    let body = json!([listing(vec![link("post")]), listing(comments)]);
    parse_submission(&body).unwrap().1
}

fn flat_ids(forest: &CommentForest) -> Vec<&str> {
    forest.flatten().iter().map(|c| c.id.as_str()).collect()
}

async fn mount_children(server: &MockServer, children: &str, things: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("children", children))
        .and(query_param("link_id", "t3_post"))
        .respond_with(ResponseTemplate::new(200).set_body_json(more_children_response(things)))
        .expect(1)
        .mount(server)
        .await;
}

fn placeholder(ids: &[String]) -> MoreComments {
    MoreComments {
        id: "m".to_string(),
        name: "t1_m".to_string(),
        parent_id: "t3_post".to_string(),
        count: ids.len() as u64,
        children: ids.to_vec(),
        link_id: "t3_post".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_expand_resolves_nested_placeholders() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    mount_children(
        &server,
        "c2,c3",
        vec![
            comment("c2", "t1_c1", json!("")),
            comment("c3", "t1_c2", json!("")),
            more("m2", "t1_c2", &["c5"]),
        ],
    )
    .await;
    mount_children(&server, "c5", vec![comment("c5", "t1_c2", json!(""))]).await;
    mount_children(&server, "c4", vec![comment("c4", "t3_post", json!(""))]).await;

    let mut forest = thread(vec![
        comment("c1", "t3_post", listing(vec![more("m1", "t1_c1", &["c2", "c3"])])),
        more("m0", "t3_post", &["c4"]),
    ]);
    assert_eq!(forest.placeholder_count(), 2);

    ForestExpander::new(client).expand(&mut forest).await.unwrap();

    assert_eq!(forest.placeholder_count(), 0);
    assert_eq!(forest.len(), 2);
    assert_eq!(flat_ids(&forest), vec!["c1", "c2", "c3", "c5", "c4"]);
}

async fn api_requests(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .filter(|p| p != "/api/v1/access_token")
        .collect()
}

#[tokio::test]
async fn test_resolve_empty_placeholder_is_noop() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let mut more = placeholder(&[]);
    more.parent_id = "t1_c1".to_string();
    assert!(more.is_continue_thread());

    let items = ForestExpander::new(client).resolve(&mut more).await.unwrap();

    assert!(items.is_empty());
    assert!(api_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_resolve_sends_bare_placeholder_id() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("id", "m"))
        .and(query_param("children", "x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(more_children_response(vec![
            comment("x", "t3_post", json!("")),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut more = placeholder(&["x".to_string()]);
    let items = ForestExpander::new(client).resolve(&mut more).await.unwrap();

    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_resolve_batches_child_ids() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let ids: Vec<String> = (0..150).map(|i| format!("k{i}")).collect();
    for chunk in ids.chunks(100) {
        let things = chunk
            .iter()
            .map(|id| comment(id, "t3_post", json!("")))
            .collect();
        mount_children(&server, &chunk.join(","), things).await;
    }

    let mut more = placeholder(&ids);
    let items = ForestExpander::new(client).resolve(&mut more).await.unwrap();

    assert_eq!(items.len(), 150);
    assert_eq!(items[0].id(), "k0");
    assert_eq!(items[149].id(), "k149");
    assert!(!more.has_pending());
    assert!(more.resolved.is_empty());
}

#[tokio::test]
async fn test_failed_batch_leaves_tree_resumable() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    mount_children(
        &server,
        "a,b",
        vec![comment("a", "t3_post", json!("")), comment("b", "t3_post", json!(""))],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .and(query_param("children", "c,d"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_children(
        &server,
        "c,d",
        vec![comment("c", "t3_post", json!("")), comment("d", "t3_post", json!(""))],
    )
    .await;

    let mut forest = thread(vec![more("m", "t3_post", &["a", "b", "c", "d"])]);
    let expander = ForestExpander::new(client).batch_size(2);

    let err = expander.expand(&mut forest).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let pending = forest.placeholders().next().unwrap();
    assert_eq!(pending.children, vec!["c".to_string(), "d".to_string()]);
    assert_eq!(pending.resolved.len(), 2);

    expander.expand(&mut forest).await.unwrap();
    assert_eq!(forest.placeholder_count(), 0);
    assert_eq!(flat_ids(&forest), vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn test_api_errors_keep_placeholder() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/morechildren"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": {"errors": [["TOO_MUCH", "slow down", null]]}
        })))
        .mount(&server)
        .await;

    let mut more = placeholder(&["x".to_string()]);
    let err = ForestExpander::new(client).resolve(&mut more).await.unwrap_err();

    assert_eq!(err.status(), Some(200));
    assert_eq!(more.children, vec!["x".to_string()]);
}

#[tokio::test]
async fn test_continue_thread_loads_parent_page() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/comments/post/_/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![link("post")]),
            listing(vec![comment(
                "c1",
                "t3_post",
                listing(vec![comment("c9", "t1_c1", json!(""))])
            )]),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut forest = thread(vec![comment(
        "c1",
        "t3_post",
        listing(vec![more("_", "t1_c1", &[])]),
    )]);
    let mut continuation = forest.items[0]
        .as_comment()
        .unwrap()
        .replies
        .placeholders()
        .next()
        .unwrap()
        .clone();
    assert!(continuation.is_continue_thread());
    continuation.link_id = forest.link_id.clone();

    let items = ForestExpander::new(client)
        .continue_thread(&mut continuation)
        .await
        .unwrap();

    let ids: Vec<&str> = items.iter().map(Item::id).collect();
    assert_eq!(ids, vec!["c9"]);
}

#[tokio::test]
async fn test_expand_drops_continue_thread_links_without_requests() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let mut forest = thread(vec![comment(
        "c1",
        "t3_post",
        listing(vec![more("_", "t1_c1", &[])]),
    )]);
    ForestExpander::new(client).expand(&mut forest).await.unwrap();

    assert_eq!(forest.placeholder_count(), 0);
    assert_eq!(flat_ids(&forest), vec!["c1"]);
    assert!(api_requests(&server).await.is_empty());
}

#[tokio::test]
async fn test_expand_without_placeholders_makes_no_requests() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    let mut forest = thread(vec![comment(
        "c1",
        "t3_post",
        listing(vec![comment("c2", "t1_c1", json!(""))]),
    )]);
    let before = forest.clone();
    ForestExpander::new(client).expand(&mut forest).await.unwrap();

    assert_eq!(forest, before);
    assert!(server.received_requests().await.unwrap().is_empty());
}

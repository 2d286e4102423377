//! Capability traits
//!
//! Each action the API offers on an item is a small trait with default
//! methods; an entity opts in by implementing the trait. All actions go
//! through the shared [`HttpClient`] and so count against the same budget.

use super::item::{fullname_or_prefixed, Comment, Item, Message, Post};
use crate::endpoints;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::listing::parse_things;
use async_trait::async_trait;
use tracing::debug;

/// Anything addressable by fullname
pub trait Thing {
    /// Kind-prefixed id
    fn fullname(&self) -> String;
}

/// Vote direction accepted by `/api/vote`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
    Clear,
}

impl VoteDirection {
    fn as_param(self) -> &'static str {
        match self {
            VoteDirection::Up => "1",
            VoteDirection::Down => "-1",
            VoteDirection::Clear => "0",
        }
    }
}

async fn post_id(client: &HttpClient, endpoint: &str, fullname: String) -> Result<()> {
    debug!(endpoint, %fullname, "item action");
    client
        .post(endpoint, RequestConfig::new().form("id", fullname))
        .await?;
    Ok(())
}

#[async_trait]
pub trait Votable: Thing + Sync {
    async fn vote(&self, client: &HttpClient, direction: VoteDirection) -> Result<()> {
        client
            .post(
                endpoints::VOTE,
                RequestConfig::new()
                    .form("id", self.fullname())
                    .form("dir", direction.as_param()),
            )
            .await?;
        Ok(())
    }

    async fn upvote(&self, client: &HttpClient) -> Result<()> {
        self.vote(client, VoteDirection::Up).await
    }

    async fn downvote(&self, client: &HttpClient) -> Result<()> {
        self.vote(client, VoteDirection::Down).await
    }

    async fn clear_vote(&self, client: &HttpClient) -> Result<()> {
        self.vote(client, VoteDirection::Clear).await
    }
}

#[async_trait]
pub trait Deletable: Thing + Sync {
    async fn delete(&self, client: &HttpClient) -> Result<()> {
        post_id(client, endpoints::DELETE, self.fullname()).await
    }
}

#[async_trait]
pub trait Hideable: Thing + Sync {
    async fn hide(&self, client: &HttpClient) -> Result<()> {
        post_id(client, endpoints::HIDE, self.fullname()).await
    }

    async fn unhide(&self, client: &HttpClient) -> Result<()> {
        post_id(client, endpoints::UNHIDE, self.fullname()).await
    }
}

#[async_trait]
pub trait Savable: Thing + Sync {
    async fn save(&self, client: &HttpClient, category: Option<&str>) -> Result<()> {
        let mut request = RequestConfig::new().form("id", self.fullname());
        if let Some(category) = category {
            request = request.form("category", category);
        }
        client.post(endpoints::SAVE, request).await?;
        Ok(())
    }

    async fn unsave(&self, client: &HttpClient) -> Result<()> {
        post_id(client, endpoints::UNSAVE, self.fullname()).await
    }
}

#[async_trait]
pub trait Replyable: Thing + Sync {
    /// Reply with markdown `text`; returns the created item when the API echoes it
    async fn reply(&self, client: &HttpClient, text: &str) -> Result<Option<Item>> {
        let response = client
            .post(
                endpoints::COMMENT,
                RequestConfig::new()
                    .form("thing_id", self.fullname())
                    .form("text", text),
            )
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        Ok(parse_things(&response, None)?.into_iter().next())
    }
}

impl Thing for Post {
    fn fullname(&self) -> String {
        fullname_or_prefixed(&self.name, &self.id, "t3")
    }
}

impl Thing for Comment {
    fn fullname(&self) -> String {
        fullname_or_prefixed(&self.name, &self.id, "t1")
    }
}

impl Thing for Message {
    fn fullname(&self) -> String {
        fullname_or_prefixed(&self.name, &self.id, "t4")
    }
}

impl Votable for Post {}
impl Deletable for Post {}
impl Hideable for Post {}
impl Savable for Post {}
impl Replyable for Post {}

impl Votable for Comment {}
impl Deletable for Comment {}
impl Savable for Comment {}
impl Replyable for Comment {}

impl Replyable for Message {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{comment, mock_client};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post() -> Post {
        Post {
            id: "abc".to_string(),
            name: "t3_abc".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_thing_fullname() {
        let comment = Comment {
            id: "c1".to_string(),
            ..Default::default()
        };
        assert_eq!(comment.fullname(), "t1_c1");
        assert_eq!(post().fullname(), "t3_abc");
    }

    #[tokio::test]
    async fn test_vote_directions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vote"))
            .and(body_string_contains("id=t3_abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(3)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let post = post();
        post.upvote(&client).await.unwrap();
        post.downvote(&client).await.unwrap();
        post.clear_vote(&client).await.unwrap();

        let bodies: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path() == "/api/vote")
            .map(|r| String::from_utf8(r.body).unwrap())
            .collect();
        assert_eq!(bodies.len(), 3);
        assert!(bodies[0].contains("dir=1"));
        assert!(bodies[1].contains("dir=-1"));
        assert!(bodies[2].contains("dir=0"));
    }

    #[tokio::test]
    async fn test_hide_and_save_endpoints() {
        let server = MockServer::start().await;
        for endpoint in ["/api/hide", "/api/unhide", "/api/save", "/api/unsave", "/api/del"] {
            Mock::given(method("POST"))
                .and(path(endpoint))
                .and(body_string_contains("id=t3_abc"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;
        }
        let client = mock_client(&server).await;
        let post = post();
        post.hide(&client).await.unwrap();
        post.unhide(&client).await.unwrap();
        post.save(&client, None).await.unwrap();
        post.unsave(&client).await.unwrap();
        post.delete(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_returns_created_comment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comment"))
            .and(body_string_contains("thing_id=t3_abc"))
            .and(body_string_contains("text=hello"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {
                    "errors": [],
                    "data": { "things": [comment("new", "t3_abc", json!(""))] }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let created = post().reply(&client, "hello").await.unwrap().unwrap();
        assert_eq!(created.fullname().as_deref(), Some("t1_new"));
    }

    #[tokio::test]
    async fn test_reply_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "json": {
                    "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]],
                    "data": {}
                }
            })))
            .mount(&server)
            .await;

        let client = mock_client(&server).await;
        let err = post().reply(&client, "hello").await.unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("RATELIMIT"));
    }
}

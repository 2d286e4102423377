//! Client façade
//!
//! [`Reddit`] owns the shared [`HttpClient`] and hands out generators,
//! streams and expanders bound to it. Everything created from one `Reddit`
//! shares a single token and a single rate budget.

use crate::auth::Credentials;
use crate::config::ClientConfig;
use crate::endpoints;
use crate::error::{Error, Result};
use crate::forest::ForestExpander;
use crate::http::{HttpClient, HttpClientConfig, RateBudget, RequestConfig};
use crate::listing::{parse_item, parse_listing, parse_submission, CommentForest};
use crate::models::{Item, Post, User};
use crate::pagination::{ItemStream, ListingEndpoint, ListingGenerator, MAX_PAGE_SIZE};
use crate::stream::{StreamConfig, StreamingPoller};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Entry point to the API
#[derive(Debug, Clone)]
pub struct Reddit {
    client: Arc<HttpClient>,
    stream_config: StreamConfig,
}

impl Reddit {
    /// Create a client with default settings
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(HttpClientConfig::default(), credentials, StreamConfig::default())
    }

    pub fn with_config(
        http: HttpClientConfig,
        credentials: Credentials,
        stream_config: StreamConfig,
    ) -> Result<Self> {
        let client = HttpClient::with_config(http, credentials)?;
        Ok(Self::from_client(Arc::new(client), stream_config))
    }

    /// Create a client from a loaded configuration file
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_config(
            config.http_config(),
            config.credentials()?,
            config.stream_config()?,
        )
    }

    /// Wrap an existing executor
    pub fn from_client(client: Arc<HttpClient>, stream_config: StreamConfig) -> Self {
        Self {
            client,
            stream_config,
        }
    }

    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// Snapshot of the server-reported budget
    pub async fn rate_budget(&self) -> RateBudget {
        self.client.rate_budget().await
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Paginate any listing endpoint
    pub fn listing(&self, endpoint: impl Into<String>) -> ListingGenerator {
        ListingGenerator::new(Arc::clone(&self.client), endpoint)
    }

    /// A re-fetchable source for streaming
    pub fn source(&self, endpoint: impl Into<String>) -> ListingEndpoint {
        ListingEndpoint::new(Arc::clone(&self.client), endpoint)
    }

    /// Tail a listing endpoint, yielding each new item once
    pub fn stream(&self, endpoint: impl Into<String>, skip_existing: bool) -> ItemStream {
        StreamingPoller::with_config(self.source(endpoint), self.stream_config.clone())
            .stream(skip_existing)
    }

    pub fn subreddit_new(&self, subreddit: &str) -> ListingGenerator {
        self.listing(endpoints::subreddit_new(subreddit))
    }

    pub fn subreddit_hot(&self, subreddit: &str) -> ListingGenerator {
        self.listing(endpoints::subreddit_hot(subreddit))
    }

    pub fn subreddit_comments(&self, subreddit: &str) -> ListingGenerator {
        self.listing(endpoints::subreddit_comments(subreddit))
    }

    /// Moderation log; requires moderator access
    pub fn subreddit_modlog(&self, subreddit: &str) -> ListingGenerator {
        self.listing(endpoints::subreddit_modlog(subreddit))
    }

    pub fn user_comments(&self, username: &str) -> ListingGenerator {
        self.listing(endpoints::user_comments(username))
    }

    pub fn user_submissions(&self, username: &str) -> ListingGenerator {
        self.listing(endpoints::user_submissions(username))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Fetch items by fullname, 100 per request, in the order returned
    pub async fn info<S: AsRef<str>>(&self, fullnames: &[S]) -> Result<Vec<Item>> {
        let mut items = Vec::with_capacity(fullnames.len());
        for chunk in fullnames.chunks(MAX_PAGE_SIZE) {
            let ids = chunk
                .iter()
                .map(AsRef::<str>::as_ref)
                .collect::<Vec<_>>()
                .join(",");
            let body = self
                .client
                .get(endpoints::INFO, RequestConfig::new().query("id", ids))
                .await?;
            items.extend(parse_listing(&body)?);
        }
        debug!(requested = fullnames.len(), found = items.len(), "looked up items");
        Ok(items)
    }

    /// A submission and its comment tree, as returned (placeholders included)
    pub async fn submission(&self, id: &str) -> Result<(Post, CommentForest)> {
        let body = self
            .client
            .get(&endpoints::submission(id), RequestConfig::new())
            .await?;
        parse_submission(&body)
    }

    /// The authenticated account
    pub async fn me(&self) -> Result<User> {
        let body = self.client.get(endpoints::ME, RequestConfig::new()).await?;
        match parse_item(&json!({"kind": "t2", "data": body}), None)? {
            Item::User(user) => Ok(user),
            other => Err(Error::parse(format!(
                "expected an account, got {}",
                other.kind()
            ))),
        }
    }

    /// Placeholder resolution bound to this client
    pub fn expander(&self) -> ForestExpander {
        ForestExpander::new(Arc::clone(&self.client))
    }
}

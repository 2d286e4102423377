//! Auth session implementation
//!
//! Owns the credentials and the current token, and refreshes the token
//! through the password grant when it has expired.

use super::types::{Credentials, TokenResponse, TokenState};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Session holding credentials and the current bearer token
pub struct AuthSession {
    /// Credentials used for every refresh
    credentials: Credentials,
    /// Token endpoint URL
    token_url: String,
    /// Cached token; the write lock doubles as the single in-flight refresh guard
    token: RwLock<Option<TokenState>>,
    /// HTTP client for token requests
    http_client: Client,
    /// Number of completed refreshes
    refreshes: AtomicU64,
}

impl AuthSession {
    /// Create a new session against the default token endpoint
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(credentials, DEFAULT_TOKEN_URL, Client::new())
    }

    /// Create a session with a custom token endpoint and HTTP client
    pub fn with_client(
        credentials: Credentials,
        token_url: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            token: RwLock::new(None),
            http_client,
            refreshes: AtomicU64::new(0),
        }
    }

    /// The credentials this session authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Token endpoint in use
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Number of token refreshes performed so far
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Request headers carrying a token that is valid at return time
    pub async fn headers(&self) -> Result<HeaderMap> {
        let token = self.token().await?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization())
                .map_err(|e| Error::auth(format!("token is not a valid header value: {e}")))?,
        );
        headers.insert(USER_AGENT, self.user_agent_header()?);
        Ok(headers)
    }

    /// Get a valid token, refreshing if necessary
    pub async fn token(&self) -> Result<TokenState> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
            }
        }

        // Concurrent callers queue on the write lock and reuse the winner's token
        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the cached token so the next request refreshes
    pub async fn invalidate(&self) {
        let mut cached = self.token.write().await;
        *cached = None;
    }

    /// Perform the password grant against the token endpoint
    async fn fetch_token(&self) -> Result<TokenState> {
        debug!(url = %self.token_url, "requesting access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .header(USER_AGENT, self.user_agent_header()?)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .form(&self.credentials.password_grant())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Transport)?;
        if status != StatusCode::OK {
            return Err(Error::auth(format!(
                "token request failed with status {}: {body}",
                status.as_u16()
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::parse(format!("malformed token response: {e}")))?;
        let token = token_response.into_token_state()?;

        self.refreshes.fetch_add(1, Ordering::Relaxed);
        info!(
            username = %self.credentials.username,
            expires_at = %token.expires_at,
            "access token refreshed"
        );
        Ok(token)
    }

    fn user_agent_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.credentials.user_agent)
            .map_err(|e| Error::config(format!("invalid user agent: {e}")))
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .field("refreshes", &self.refresh_count())
            .finish_non_exhaustive()
    }
}

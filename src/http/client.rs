//! Rate-limited request executor
//!
//! Every request goes through the same steps:
//! - enqueue with the budget tracker and wait if the budget is low
//! - wait for the optional local throttle
//! - attach a valid Authorization and User-Agent header
//! - send, then record the rate-limit headers of the response
//! - return the parsed JSON body, or classify the failure

use super::rate_limit::{RateBudget, RateLimitConfig, RateLimitTracker, Throttle, ThrottleConfig};
use crate::auth::{AuthSession, Credentials, DEFAULT_TOKEN_URL};
use crate::error::{Error, Result};
use crate::types::{Method, StringMap};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API host for authenticated requests
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for endpoint paths
    pub api_base_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Server budget gating
    pub rate_limit: RateLimitConfig,
    /// Optional local token bucket
    pub throttle: Option<ThrottleConfig>,
    /// Query parameters added to every request
    pub default_params: StringMap,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_params = StringMap::new();
        default_params.insert("raw_json".to_string(), "1".to_string());
        default_params.insert("api_type".to_string(), "json".to_string());

        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
            throttle: None,
            default_params,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Set the token endpoint URL
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set budget gating
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Enable the local throttle
    pub fn throttle(mut self, config: ThrottleConfig) -> Self {
        self.config.throttle = Some(config);
        self
    }

    /// Add a default query parameter
    pub fn default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_params.insert(key.into(), value.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: StringMap,
    /// Form-encoded body
    pub form: StringMap,
    /// JSON body (takes precedence over form)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a form field
    #[must_use]
    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP client with auth and rate-limit budget tracking
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    base_url: Url,
    session: AuthSession,
    rate_limit: RateLimitTracker,
    throttle: Option<Throttle>,
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(HttpClientConfig::default(), credentials)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        credentials.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&credentials.user_agent)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(&config.api_base_url)?;
        let session = AuthSession::with_client(credentials, &config.token_url, client.clone());
        let rate_limit = RateLimitTracker::new(config.rate_limit.clone());
        let throttle = config.throttle.as_ref().map(Throttle::new);

        Ok(Self {
            client,
            config,
            base_url,
            session,
            rate_limit,
            throttle,
        })
    }

    /// The auth session shared by all requests
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Budget tracker shared by all requests
    pub fn rate_limiter(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    /// Snapshot of the server-reported budget
    pub async fn rate_budget(&self) -> RateBudget {
        self.rate_limit.budget().await
    }

    /// Make a GET request
    pub async fn get(&self, endpoint: &str, config: RequestConfig) -> Result<Value> {
        self.execute(Method::GET, endpoint, config).await
    }

    /// Make a POST request
    pub async fn post(&self, endpoint: &str, config: RequestConfig) -> Result<Value> {
        self.execute(Method::POST, endpoint, config).await
    }

    /// Make a PUT request
    pub async fn put(&self, endpoint: &str, config: RequestConfig) -> Result<Value> {
        self.execute(Method::PUT, endpoint, config).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, endpoint: &str, config: RequestConfig) -> Result<Value> {
        self.execute(Method::DELETE, endpoint, config).await
    }

    /// Execute a request against an endpoint path or absolute URL
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        config: RequestConfig,
    ) -> Result<Value> {
        let url = self.build_url(endpoint)?;

        // Held until the response is consumed, so later callers see us ahead of them
        let ticket = self.rate_limit.acquire().await;
        if let Some(ref throttle) = self.throttle {
            throttle.wait().await;
        }

        let headers = self.session.headers().await?;

        let mut query = self.config.default_params.clone();
        query.extend(config.query);

        let mut req = self
            .client
            .request(method.into(), url.clone())
            .headers(headers)
            .query(&query);

        if let Some(ref body) = config.body {
            req = req.json(body);
        } else if !config.form.is_empty() {
            req = req.form(&config.form);
        }
        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        debug!(request_id = ticket.id(), %method, %url, "sending request");
        let response = req.send().await.map_err(Error::Transport)?;
        self.rate_limit.update(response.headers()).await;

        let status = response.status();
        let body = response.text().await.map_err(Error::Transport)?;
        drop(ticket);

        if !status.is_success() {
            debug!(status = status.as_u16(), %url, "request failed");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.session.invalidate().await;
            }
            return Err(Error::api(status.as_u16(), body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::parse(format!("response from {endpoint} is not valid JSON: {e}")))
    }

    /// Build full URL from an endpoint path or absolute URL
    pub fn build_url(&self, endpoint: &str) -> Result<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Url::parse(endpoint)?);
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("has_throttle", &self.throttle.is_some())
            .finish_non_exhaustive()
    }
}

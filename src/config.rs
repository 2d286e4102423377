//! Client configuration
//!
//! A YAML file holds one client configuration at the top level and,
//! optionally, named profiles under `profiles`:
//!
//! ```yaml
//! credentials:
//!   client_id: abc
//!   client_secret: xyz
//!   user_agent: my-bot/0.1 by alice
//! profiles:
//!   bot:
//!     credentials:
//!       username: alice
//!       password: hunter2
//!     stream:
//!       max_wait_secs: 32
//! ```
//!
//! Credential fields left empty in a profile fall back to the top-level
//! values. Every other section of a profile stands on its own.

use crate::auth::{Credentials, DEFAULT_TOKEN_URL};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimitConfig, ThrottleConfig, DEFAULT_API_URL};
use crate::pagination::MAX_PAGE_SIZE;
use crate::stream::StreamConfig;
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub stream: StreamSettings,
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub default: ClientConfig,

    #[serde(default)]
    pub profiles: HashMap<String, ClientConfig>,
}

// ============================================================================
// Sections
// ============================================================================

/// OAuth application and account
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Defaults to `rsnoo/<version>`
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl CredentialsConfig {
    /// Fill empty fields from `fallback`
    pub fn or(self, fallback: &CredentialsConfig) -> Self {
        let pick = |value: String, other: &String| {
            value.none_if_empty().unwrap_or_else(|| other.clone())
        };
        Self {
            client_id: pick(self.client_id, &fallback.client_id),
            client_secret: pick(self.client_secret, &fallback.client_secret),
            username: pick(self.username, &fallback.username),
            password: pick(self.password, &fallback.password),
            user_agent: self
                .user_agent
                .none_if_empty()
                .or_else(|| fallback.user_agent.clone()),
        }
    }
}

/// Where requests go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_url: default_token_url(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Local request rate cap; unset means no local throttle
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Burst allowed by the local throttle; defaults to `requests_per_second`
    #[serde(default)]
    pub burst_size: Option<u32>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            requests_per_second: None,
            burst_size: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Server budget gating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Remaining requests at or below which the gate engages
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: f64,

    /// Spacing between queued requests, in milliseconds
    #[serde(default = "default_queue_offset_ms")]
    pub queue_offset_ms: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            safety_threshold: default_safety_threshold(),
            queue_offset_ms: default_queue_offset_ms(),
        }
    }
}

fn default_safety_threshold() -> f64 {
    1.0
}

fn default_queue_offset_ms() -> u64 {
    1000
}

/// Live polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,

    #[serde(default = "default_min_wait")]
    pub min_wait_secs: u64,

    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            dedup_capacity: default_dedup_capacity(),
            min_wait_secs: default_min_wait(),
            max_wait_secs: default_max_wait(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_dedup_capacity() -> usize {
    300
}

fn default_min_wait() -> u64 {
    1
}

fn default_max_wait() -> u64 {
    16
}

// ============================================================================
// Conversions
// ============================================================================

impl ClientConfig {
    /// Validated credentials
    pub fn credentials(&self) -> Result<Credentials> {
        let c = &self.credentials;
        let user_agent = c
            .user_agent
            .clone()
            .none_if_empty()
            .unwrap_or_else(|| format!("{}/{}", crate::NAME, crate::VERSION));
        let credentials = Credentials::new(
            &c.client_id,
            &c.client_secret,
            &c.username,
            &c.password,
            user_agent,
        );
        credentials.validate()?;
        Ok(credentials)
    }

    /// Settings for the HTTP client
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .api_base_url(&self.endpoints.api_base_url)
            .token_url(&self.endpoints.token_url)
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .rate_limit(RateLimitConfig::new(
                self.rate_limit.safety_threshold,
                Duration::from_millis(self.rate_limit.queue_offset_ms),
            ));

        if let Some(rps) = self.http.requests_per_second {
            let burst = self.http.burst_size.unwrap_or(rps);
            builder = builder.throttle(ThrottleConfig::new(rps, burst));
        }
        builder.build()
    }

    /// Validated settings for streaming
    pub fn stream_config(&self) -> Result<StreamConfig> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.stream.batch_size) {
            return Err(Error::config(format!(
                "stream.batch_size must be 1..={MAX_PAGE_SIZE}, got {}",
                self.stream.batch_size
            )));
        }
        Ok(StreamConfig {
            batch_size: self.stream.batch_size,
            dedup_capacity: self.stream.dedup_capacity,
            min_wait: Duration::from_secs(self.stream.min_wait_secs),
            max_wait: Duration::from_secs(self.stream.max_wait_secs),
        })
    }
}

// ============================================================================
// Loading
// ============================================================================

impl ConfigFile {
    /// Parse a configuration file's contents
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Look up a profile, merging its credentials over the top-level ones
    pub fn profile(&self, name: &str) -> Result<ClientConfig> {
        let profile = self
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("Profile '{name}' not found")))?;
        Ok(ClientConfig {
            credentials: profile.credentials.or(&self.default.credentials),
            ..profile
        })
    }
}

/// Load the top-level configuration of a file
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    Ok(ConfigFile::load(path)?.default)
}

/// Load a named profile of a file
pub fn load_profile(path: impl AsRef<Path>, name: &str) -> Result<ClientConfig> {
    ConfigFile::load(path)?.profile(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const YAML: &str = r#"
credentials:
  client_id: abc
  client_secret: xyz
  username: alice
  password: hunter2
  user_agent: test-agent/1.0
http:
  requests_per_second: 2
rate_limit:
  queue_offset_ms: 250
profiles:
  bot:
    credentials:
      username: botuser
      password: botpass
    stream:
      max_wait_secs: 32
"#;

    #[test]
    fn test_defaults() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.endpoints.api_base_url, "https://oauth.reddit.com");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.rate_limit.safety_threshold, 1.0);
        assert_eq!(config.stream_config().unwrap(), StreamConfig::default());
        assert!(config.http_config().throttle.is_none());
    }

    #[test]
    fn test_conversions() {
        let file = ConfigFile::from_yaml_str(YAML).unwrap();
        let http = file.default.http_config();
        assert_eq!(http.throttle, Some(ThrottleConfig::new(2, 2)));
        assert_eq!(http.rate_limit.queue_offset, Duration::from_millis(250));
        assert_eq!(http.timeout, Duration::from_secs(30));

        let credentials = file.default.credentials().unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_stream_batch_size_out_of_range() {
        for size in [0, 101] {
            let config: ClientConfig =
                serde_yaml::from_str(&format!("stream:\n  batch_size: {size}\n")).unwrap();
            let err = config.stream_config().unwrap_err();
            assert!(matches!(err, Error::Config { .. }));
            assert!(err.to_string().contains("stream.batch_size"));
        }
    }

    #[test]
    fn test_profile_inherits_credentials() {
        let file = ConfigFile::from_yaml_str(YAML).unwrap();
        let bot = file.profile("bot").unwrap();

        let credentials = bot.credentials().unwrap();
        assert_eq!(credentials.client_id, "abc");
        assert_eq!(credentials.username, "botuser");
        assert_eq!(credentials.password, "botpass");
        assert_eq!(bot.stream.max_wait_secs, 32);
        assert_eq!(bot.rate_limit, RateLimitSettings::default());
    }

    #[test]
    fn test_unknown_profile() {
        let file = ConfigFile::from_yaml_str(YAML).unwrap();
        let err = file.profile("nope").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_missing_credential_field() {
        let config: ClientConfig =
            serde_yaml::from_str("credentials:\n  client_id: abc\n").unwrap();
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "client_secret"));
    }

    #[test]
    fn test_default_user_agent() {
        let config: ClientConfig = serde_yaml::from_str(
            "credentials: {client_id: a, client_secret: b, username: c, password: d}",
        )
        .unwrap();
        let agent = config.credentials().unwrap().user_agent;
        assert!(agent.starts_with("rsnoo/"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.credentials.client_id, "abc");
        let bot = load_profile(file.path(), "bot").unwrap();
        assert_eq!(bot.credentials.username, "botuser");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/rsnoo.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = ConfigFile::from_yaml_str("credentials: [").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let file = ConfigFile::from_yaml_str(YAML).unwrap();
        let debug = format!("{:?}", file.default.credentials);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("xyz"));
    }
}

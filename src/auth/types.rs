//! Auth types
//!
//! Credentials are immutable for the lifetime of a session; the token state
//! is replaced wholesale on every refresh.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Identity used for the password grant
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth application id
    pub client_id: String,
    /// OAuth application secret
    pub client_secret: String,
    /// Resource-owner username
    pub username: String,
    /// Resource-owner password
    pub password: String,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Credentials {
    /// Create a new set of credentials
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Ensure no field is empty
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
            ("user_agent", &self.user_agent),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(Error::missing_field(name));
            }
        }
        Ok(())
    }

    /// Form body of the password grant
    pub fn password_grant(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", "password"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ]
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Current bearer token and its expiry
#[derive(Clone)]
pub struct TokenState {
    /// Token type as reported by the token endpoint (usually "bearer")
    pub token_type: String,
    /// The access token
    pub access_token: String,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    /// Create a token state
    pub fn new(
        token_type: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_type: token_type.into(),
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(
        token_type: impl Into<String>,
        access_token: impl Into<String>,
        seconds: i64,
    ) -> Self {
        Self::new(
            token_type,
            access_token,
            Utc::now() + chrono::Duration::seconds(seconds),
        )
    }

    /// Check if the token is expired at this instant
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value of the Authorization header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TokenResponse {
    /// Convert into token state, rejecting error payloads
    pub(crate) fn into_token_state(self) -> Result<TokenState> {
        if let Some(error) = self.error {
            return Err(Error::auth(format!("token endpoint rejected grant: {error}")));
        }
        let access_token = self
            .access_token
            .ok_or_else(|| Error::parse("token response has no access_token"))?;
        let expires_in = self
            .expires_in
            .ok_or_else(|| Error::parse("token response has no expires_in"))?;
        let token_type = self.token_type.unwrap_or_else(|| "bearer".to_string());
        Ok(TokenState::expires_in(token_type, access_token, expires_in))
    }
}

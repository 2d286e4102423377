//! Authentication module
//!
//! Password-grant OAuth session: holds the credentials, caches the bearer
//! token, and refreshes it before any request would go out with an expired
//! one. Concurrent callers share a single in-flight refresh.

mod session;
mod types;

pub use session::{AuthSession, DEFAULT_TOKEN_URL};
pub use types::{Credentials, TokenState};

#[cfg(test)]
mod tests;

//! # rsnoo
//!
//! Async client core for the Reddit API: authenticated, rate-limited
//! requests, cursor pagination, live streams and comment forests.
//!
//! ## Features
//!
//! - **Shared Budget**: Every request waits on one server-reported rate budget
//! - **Lazy Pagination**: Listings are fetched page by page as items are pulled
//! - **Streaming**: Poll a listing forever and get each new item exactly once
//! - **Comment Forests**: Resolve "more comments" placeholders into full trees
//! - **Typed Items**: Kind-tagged records become posts, comments, users and more
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use rsnoo::{Credentials, Reddit, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let reddit = Reddit::new(Credentials::new(
//!         "client-id", "secret", "alice", "hunter2", "my-bot/0.1 by alice",
//!     ))?;
//!
//!     // Newest 50 submissions
//!     let posts = reddit.subreddit_new("rust").limit(Some(50)).collect_all().await?;
//!
//!     // Every new comment from now on
//!     let mut comments = reddit.stream("/r/rust/comments", true);
//!     while let Some(comment) = comments.next().await {
//!         println!("{:?}", comment?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           Reddit                             │
//! │  listing()   stream()   submission()   info()   expander()   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴─────┬───────────────────────────┐
//! │  Pagination  │     Streaming      │          Forest           │
//! ├──────────────┼────────────────────┼───────────────────────────┤
//! │ Cursor pages │ Dedup window       │ Batched morechildren      │
//! │ Limit        │ Backoff            │ Depth-first splicing      │
//! └──────────────┴────────────────────┴───────────────────────────┘
//!                               │
//! ┌──────────────────────────────────────────────────────────────┐
//! │      HttpClient: token refresh, budget gate, throttle        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Password-grant authentication
pub mod auth;

/// HTTP client with rate-limit budget tracking
pub mod http;

/// API endpoint paths
pub mod endpoints;

/// Typed items and capability traits
pub mod models;

/// Listing pages and kind dispatch
pub mod listing;

/// Cursor pagination
pub mod pagination;

/// Live polling with dedup and backoff
pub mod stream;

/// Comment placeholder expansion
pub mod forest;

/// Client façade
pub mod reddit;

/// Configuration file loading
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::Credentials;
pub use config::{load_config, load_profile, ClientConfig};
pub use error::{Error, Result};
pub use forest::ForestExpander;
pub use listing::{CommentForest, Listing};
pub use models::{Item, Kind};
pub use pagination::{ItemStream, ListingGenerator, ListingSource};
pub use reddit::Reddit;
pub use stream::{StreamConfig, StreamingPoller};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! HTTP client module
//!
//! Provides the rate-limited request executor shared by every listing,
//! stream and forest expansion.
//!
//! # Features
//!
//! - **Authentication**: A valid bearer token is attached to every request
//! - **Budget Gating**: Requests wait for the reset when the server-reported
//!   budget runs low, accounting for requests queued ahead
//! - **Local Throttle**: Optional token bucket rate limiter using governor
//! - **Error Classification**: Transport, API status and payload errors

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, DEFAULT_API_URL,
};
pub use rate_limit::{
    QueueTicket, RateBudget, RateLimitConfig, RateLimitTracker, Throttle, ThrottleConfig,
};

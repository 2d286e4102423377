//! Rate limiting implementation
//!
//! Two independent gates protect the API quota:
//!
//! - [`RateLimitTracker`] follows the budget the server reports in its
//!   `x-ratelimit-*` headers and holds requests back until the reset time
//!   once the remaining budget falls below a safety threshold.
//! - [`Throttle`] is an optional local token bucket (governor) that caps the
//!   request rate before any server feedback exists.

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_USED: &str = "x-ratelimit-used";
const HEADER_RESET: &str = "x-ratelimit-reset";

// ============================================================================
// Server-reported budget
// ============================================================================

/// Configuration for budget gating
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Requests are delayed while `remaining` is below this value
    pub safety_threshold: f64,
    /// Extra delay per queued request ahead of the caller
    pub queue_offset: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            safety_threshold: 1.0,
            queue_offset: Duration::from_secs(1),
        }
    }
}

impl RateLimitConfig {
    /// Create a new budget config
    pub fn new(safety_threshold: f64, queue_offset: Duration) -> Self {
        Self {
            safety_threshold,
            queue_offset,
        }
    }
}

/// Rate-limit budget as last reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RateBudget {
    /// Requests left in the current window (`None` until the first response)
    pub remaining: Option<f64>,
    /// Requests used in the current window
    pub used: Option<u64>,
    /// When the window resets
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateBudget {
    /// Update the budget from response headers, keeping fields that are absent
    pub fn update_from_headers(&mut self, headers: &HeaderMap, now: DateTime<Utc>) {
        if let Some(remaining) = header_value::<f64>(headers, HEADER_REMAINING) {
            self.remaining = Some(remaining);
        }
        if let Some(used) = header_value::<u64>(headers, HEADER_USED) {
            self.used = Some(used);
        }
        if let Some(reset) = header_value::<i64>(headers, HEADER_RESET) {
            self.reset_at = Some(now + chrono::Duration::seconds(reset));
        }
    }

    /// Whether the remaining budget is below `threshold`
    pub fn is_low(&self, threshold: f64) -> bool {
        self.remaining.is_some_and(|remaining| remaining < threshold)
    }

    /// How long a request at queue `position` must wait, if at all.
    ///
    /// `position` counts from 1 for the first request in the queue.
    pub fn delay_for(
        &self,
        config: &RateLimitConfig,
        position: usize,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        if !self.is_low(config.safety_threshold) {
            return None;
        }
        let reset_at = self.reset_at?;
        let offset = config.queue_offset * u32::try_from(position).unwrap_or(u32::MAX);
        let execute_at = reset_at + chrono::Duration::from_std(offset).ok()?;
        (execute_at - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Tracks the shared budget and the queue of in-flight requests
#[derive(Debug)]
pub struct RateLimitTracker {
    config: RateLimitConfig,
    budget: Mutex<RateBudget>,
    queue: Arc<std::sync::Mutex<VecDeque<u64>>>,
    next_id: AtomicU64,
}

impl RateLimitTracker {
    /// Create a tracker with an unknown budget
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            budget: Mutex::new(RateBudget::default()),
            queue: Arc::new(std::sync::Mutex::new(VecDeque::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Gating configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Snapshot of the current budget
    pub async fn budget(&self) -> RateBudget {
        *self.budget.lock().await
    }

    /// Replace the budget wholesale
    pub async fn set_budget(&self, budget: RateBudget) {
        *self.budget.lock().await = budget;
    }

    /// Number of requests currently queued or in flight
    pub fn queued(&self) -> usize {
        lock_queue(&self.queue).len()
    }

    /// Enqueue a request and wait until the budget allows it to proceed.
    ///
    /// The returned ticket keeps the request in the queue until dropped.
    pub async fn acquire(&self) -> QueueTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let position = {
            let mut queue = lock_queue(&self.queue);
            queue.push_back(id);
            queue.len()
        };
        let ticket = QueueTicket {
            id,
            queue: Arc::clone(&self.queue),
        };

        let budget = self.budget().await;
        if let Some(wait) = budget.delay_for(&self.config, position, Utc::now()) {
            warn!(
                request_id = id,
                position,
                remaining = ?budget.remaining,
                wait_ms = wait.as_millis() as u64,
                "rate-limit budget low, delaying request"
            );
            tokio::time::sleep(wait).await;
        }
        ticket
    }

    /// Record the budget reported in a response
    pub async fn update(&self, headers: &HeaderMap) {
        let mut budget = self.budget.lock().await;
        budget.update_from_headers(headers, Utc::now());
        debug!(
            remaining = ?budget.remaining,
            used = ?budget.used,
            reset_at = ?budget.reset_at,
            "rate-limit budget updated"
        );
    }
}

fn lock_queue(queue: &std::sync::Mutex<VecDeque<u64>>) -> std::sync::MutexGuard<'_, VecDeque<u64>> {
    queue
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Queue membership of one request; released on drop
#[derive(Debug)]
pub struct QueueTicket {
    id: u64,
    queue: Arc<std::sync::Mutex<VecDeque<u64>>>,
}

impl QueueTicket {
    /// Monotonic request id
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for QueueTicket {
    fn drop(&mut self) {
        let mut queue = lock_queue(&self.queue);
        if let Some(index) = queue.iter().position(|id| *id == self.id) {
            queue.remove(index);
        }
    }
}

// ============================================================================
// Local throttle
// ============================================================================

/// Configuration for the local token bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 1,
            burst_size: 10,
        }
    }
}

impl ThrottleConfig {
    /// Create a new throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Create a new throttle with the given config
    pub fn new(config: &ThrottleConfig) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish()
    }
}

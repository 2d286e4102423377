//! Live tailing of a listing

use super::counter::BackoffCounter;
use super::dedup::DedupWindow;
use crate::error::Result;
use crate::models::Item;
use crate::pagination::{ItemStream, ListingSource, MAX_PAGE_SIZE};
use async_stream::try_stream;
use std::time::Duration;
use tracing::debug;

/// Tuning for [`StreamingPoller`]
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Items fetched per poll
    pub batch_size: usize,
    /// Fullnames remembered across polls
    pub dedup_capacity: usize,
    /// Delay after a poll that found new items
    pub min_wait: Duration,
    /// Upper bound of the delay after empty polls
    pub max_wait: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_PAGE_SIZE,
            dedup_capacity: 300,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(16),
        }
    }
}

/// Polls a [`ListingSource`] forever and yields only items not seen before.
///
/// Each poll fetches the newest batch and walks it newest to oldest until it
/// meets a fullname already in the dedup window; everything past that point
/// was seen on an earlier poll. New items are handed out oldest first.
pub struct StreamingPoller<S> {
    source: S,
    config: StreamConfig,
    seen: DedupWindow,
    backoff: BackoffCounter,
    polls: u64,
}

impl<S: ListingSource + 'static> StreamingPoller<S> {
    /// Create a poller with default tuning
    pub fn new(source: S) -> Self {
        Self::with_config(source, StreamConfig::default())
    }

    /// Create a poller with custom tuning; the batch size is clamped to 1..=100
    pub fn with_config(source: S, mut config: StreamConfig) -> Self {
        config.batch_size = config.batch_size.clamp(1, MAX_PAGE_SIZE);
        Self {
            seen: DedupWindow::new(config.dedup_capacity),
            backoff: BackoffCounter::new(config.min_wait, config.max_wait),
            source,
            config,
            polls: 0,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Fullnames seen so far
    pub fn seen(&self) -> &DedupWindow {
        &self.seen
    }

    /// Polls completed so far
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Fetch one batch and return its unseen items, oldest first
    pub async fn poll(&mut self) -> Result<Vec<Item>> {
        let batch = self.source.fetch(self.config.batch_size).await?;
        let fetched = batch.len();

        let mut fresh = Vec::new();
        for item in batch {
            let Some(fullname) = item.fullname() else {
                continue;
            };
            if self.seen.contains(&fullname) {
                break;
            }
            self.seen.insert(fullname);
            fresh.push(item);
        }
        fresh.reverse();

        self.polls += 1;
        debug!(poll = self.polls, fetched, new = fresh.len(), "polled listing");
        Ok(fresh)
    }

    /// Delay before the next poll
    fn next_wait(&mut self, found_new: bool) -> Duration {
        if found_new {
            self.backoff.reset()
        } else {
            self.backoff.count()
        }
    }

    /// Endless stream of new items.
    ///
    /// With `skip_existing`, the first poll only fills the dedup window. The
    /// stream ends after yielding the first error; dropping it stops polling.
    pub fn stream(self, skip_existing: bool) -> ItemStream {
        let mut poller = self;
        Box::pin(try_stream! {
            let mut baseline = skip_existing;
            loop {
                let fresh = poller.poll().await?;
                let wait = poller.next_wait(!fresh.is_empty());

                if baseline {
                    debug!(recorded = fresh.len(), "skipping existing items");
                    baseline = false;
                } else {
                    for item in fresh {
                        yield item;
                    }
                }

                debug!(wait_ms = wait.as_millis() as u64, "waiting for next poll");
                tokio::time::sleep(wait).await;
            }
        })
    }
}

impl<S> std::fmt::Debug for StreamingPoller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingPoller")
            .field("config", &self.config)
            .field("seen", &self.seen.len())
            .field("polls", &self.polls)
            .finish_non_exhaustive()
    }
}

//! Pagination types and traits

use crate::error::Result;
use crate::models::Item;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Page size the API accepts at most
pub const MAX_PAGE_SIZE: usize = 100;

/// Lazy sequence of items; ends cleanly or with the first error
pub type ItemStream = Pin<Box<dyn Stream<Item = Result<Item>> + Send>>;

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Fullname of the last raw item of the most recent page
    pub cursor: Option<String>,
    /// Items handed out so far (after kind filtering)
    pub total_fetched: u64,
    /// Pages requested so far
    pub pages: u32,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Count one more page
    pub fn next_page(&mut self) {
        self.pages += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Something that can produce the newest items of a listing on demand.
///
/// The streaming poller calls this once per poll; each call starts from the
/// newest item again.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch up to `limit` items, newest first
    async fn fetch(&self, limit: usize) -> Result<Vec<Item>>;
}

//! Cursor pagination over listing endpoints

use super::types::{ItemStream, ListingSource, PaginationState, MAX_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::listing::{parse_listing, Listing};
use crate::models::{Item, Kind};
use crate::types::StringMap;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Walks a listing endpoint page by page using the `after` cursor.
///
/// Pages are fetched strictly in order, since the cursor for page N+1 is the
/// fullname of the last raw item of page N. Iteration ends when a page comes
/// back empty or `limit` items have been handed out. A generator is not
/// restartable; build a new one to start over.
pub struct ListingGenerator {
    client: Arc<HttpClient>,
    endpoint: String,
    params: StringMap,
    limit: Option<usize>,
    page_size: usize,
    kind_filter: Option<Vec<Kind>>,
    state: PaginationState,
    buffer: VecDeque<Item>,
}

impl ListingGenerator {
    /// Create an unbounded generator over `endpoint`
    pub fn new(client: Arc<HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            params: StringMap::new(),
            limit: None,
            page_size: MAX_PAGE_SIZE,
            kind_filter: None,
            state: PaginationState::new(),
            buffer: VecDeque::new(),
        }
    }

    /// Stop after this many items (`None` walks until the listing is exhausted)
    #[must_use]
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Items requested per page, clamped to `1..=100`
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Extra query parameter sent with every page request
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Only hand out items of these kinds; the cursor still follows raw items
    #[must_use]
    pub fn kind_filter(mut self, kinds: Vec<Kind>) -> Self {
        self.kind_filter = Some(kinds);
        self
    }

    /// Endpoint being paginated
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Current pagination state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Whether no further page will be requested
    pub fn is_done(&self) -> bool {
        self.state.done
    }

    fn remaining(&self) -> Option<usize> {
        self.limit
            .map(|limit| limit.saturating_sub(self.state.total_fetched as usize))
    }

    /// Fetch the next page.
    ///
    /// Returns `None` once the listing is exhausted or the limit is reached;
    /// no request is made after that. A returned page may be empty when the
    /// kind filter dropped every item of a non-empty raw page.
    pub async fn advance(&mut self) -> Result<Option<Listing>> {
        if self.state.done {
            return Ok(None);
        }

        let remaining = self.remaining();
        if remaining == Some(0) {
            self.state.mark_done();
            return Ok(None);
        }
        let request_size = remaining.map_or(self.page_size, |r| r.min(self.page_size));

        let mut request = RequestConfig::new().query("limit", request_size.to_string());
        for (key, value) in &self.params {
            request = request.query(key, value);
        }
        if let Some(cursor) = &self.state.cursor {
            request = request.query("after", cursor);
        }

        let body = self.client.get(&self.endpoint, request).await?;
        let page = parse_listing(&body)?;
        self.state.next_page();

        debug!(
            endpoint = %self.endpoint,
            page = self.state.pages,
            items = page.len(),
            after = ?self.state.cursor,
            "fetched listing page"
        );

        if page.is_empty() {
            self.state.mark_done();
            return Ok(None);
        }

        // The cursor follows the true last raw item, filtered or not
        match page.last().and_then(Item::fullname) {
            Some(cursor) => self.state.set_cursor(cursor),
            None => self.state.mark_done(),
        }

        let mut page = match &self.kind_filter {
            Some(kinds) => page.filtered(kinds),
            None => page,
        };
        if let Some(remaining) = remaining {
            page.items.truncate(remaining);
        }

        self.state.add_fetched(page.len() as u64);
        if self.remaining() == Some(0) {
            self.state.mark_done();
        }
        Ok(Some(page))
    }

    /// Next item of the lazy sequence, fetching pages as needed
    pub async fn next_item(&mut self) -> Result<Option<Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Ok(Some(item));
            }
            match self.advance().await? {
                Some(page) => self.buffer.extend(page.items),
                None => return Ok(None),
            }
        }
    }

    /// Turn the generator into a stream; dropping the stream stops requests
    pub fn into_stream(self) -> ItemStream {
        Box::pin(futures::stream::try_unfold(self, |mut generator| async move {
            let next = generator.next_item().await?;
            Ok::<_, Error>(next.map(|item| (item, generator)))
        }))
    }

    /// Drain the generator into a vector
    pub async fn collect_all(mut self) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next_item().await? {
            items.push(item);
        }
        Ok(items)
    }
}

impl std::fmt::Debug for ListingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingGenerator")
            .field("endpoint", &self.endpoint)
            .field("limit", &self.limit)
            .field("page_size", &self.page_size)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A listing endpoint as a [`ListingSource`]; every fetch uses a fresh generator
#[derive(Debug, Clone)]
pub struct ListingEndpoint {
    client: Arc<HttpClient>,
    endpoint: String,
    params: StringMap,
}

impl ListingEndpoint {
    pub fn new(client: Arc<HttpClient>, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            params: StringMap::new(),
        }
    }

    /// Extra query parameter sent with every fetch
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generator over this endpoint
    pub fn generator(&self) -> ListingGenerator {
        self.params.iter().fold(
            ListingGenerator::new(Arc::clone(&self.client), self.endpoint.clone()),
            |generator, (key, value)| generator.param(key, value),
        )
    }
}

#[async_trait]
impl ListingSource for ListingEndpoint {
    async fn fetch(&self, limit: usize) -> Result<Vec<Item>> {
        self.generator().limit(Some(limit)).collect_all().await
    }
}

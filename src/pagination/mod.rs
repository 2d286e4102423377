//! Pagination module
//!
//! # Overview
//!
//! Listing endpoints return one page at a time and take the fullname of the
//! last item seen as the `after` cursor for the next one. The
//! [`ListingGenerator`] hides that behind a single lazy item sequence; the
//! [`ListingSource`] trait is the seam the streaming poller fetches through.

mod generator;
mod types;

pub use generator::{ListingEndpoint, ListingGenerator};
pub use types::{ItemStream, ListingSource, PaginationState, MAX_PAGE_SIZE};

//! Listing module
//!
//! Turns raw page payloads into [`Listing`]s of typed items. Comment replies
//! are materialized eagerly into nested [`CommentForest`]s, so walking a
//! thread never re-fetches data that arrived in the same response.

mod dispatch;
mod types;

pub use dispatch::{parse_item, parse_listing, parse_submission, parse_things};
pub use types::{CommentForest, Listing};

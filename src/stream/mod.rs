//! Streaming module
//!
//! Live tailing of a listing: repeated polls filtered through a bounded
//! dedup window, paced by an exponential backoff that resets whenever a
//! poll turns up something new.

mod counter;
mod dedup;
mod poller;

pub use counter::BackoffCounter;
pub use dedup::DedupWindow;
pub use poller::{StreamConfig, StreamingPoller};

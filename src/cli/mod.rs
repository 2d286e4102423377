//! CLI module
//!
//! Command-line interface over the client core.
//!
//! # Commands
//!
//! - `list` - Paginate a listing endpoint
//! - `stream` - Tail a listing endpoint for new items
//! - `comments` - Fetch a submission with its comment tree
//! - `me` - Show the authenticated account

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

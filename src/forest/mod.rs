//! Comment forest expansion
//!
//! Comment threads arrive truncated: deep or long branches are replaced by
//! "more comments" placeholders listing the ids that were left out. The
//! expander fetches those ids and splices the comments back into the tree.

mod expander;

pub use expander::ForestExpander;

#[cfg(test)]
mod tests;

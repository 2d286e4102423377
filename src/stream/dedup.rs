//! Bounded recency set of fullnames

use std::collections::{HashSet, VecDeque};

/// Remembers the most recent `capacity` fullnames; the oldest is evicted first
#[derive(Debug, Clone)]
pub struct DedupWindow {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl DedupWindow {
    /// Create a window holding at least one entry
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, fullname: &str) -> bool {
        self.seen.contains(fullname)
    }

    /// Record a fullname; returns false if it was already present
    pub fn insert(&mut self, fullname: impl Into<String>) -> bool {
        let fullname = fullname.into();
        if self.seen.contains(&fullname) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        self.seen.insert(fullname.clone());
        self.order.push_back(fullname);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(300)
    }
}

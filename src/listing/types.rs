//! Materialized pages

use crate::models::{Comment, Item, Kind, MoreComments};
use serde::Serialize;

/// One page of items in the order the API returned them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    /// Materialized records
    pub items: Vec<Item>,
    /// Cursor reported by the API for the next page
    pub after: Option<String>,
    /// Cursor reported by the API for the previous page
    pub before: Option<String>,
}

impl Listing {
    /// Create a listing without cursor information
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            after: None,
            before: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Final item of the page; its fullname is the next cursor
    pub fn last(&self) -> Option<&Item> {
        self.items.last()
    }

    /// Copy of this page keeping only items of the given kinds
    pub fn filtered(&self, kinds: &[Kind]) -> Listing {
        Listing {
            items: self
                .items
                .iter()
                .filter(|item| kinds.contains(&item.kind()))
                .cloned()
                .collect(),
            after: self.after.clone(),
            before: self.before.clone(),
        }
    }
}

impl std::ops::Index<usize> for Listing {
    type Output = Item;

    fn index(&self, index: usize) -> &Item {
        &self.items[index]
    }
}

impl IntoIterator for Listing {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Reply tree of a submission or comment.
///
/// Items are comments and "more" placeholders; every comment carries its
/// own nested forest in `replies`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentForest {
    /// Fullname of the submission the tree belongs to
    pub link_id: String,
    /// Top-level items of this level
    pub items: Vec<Item>,
}

impl CommentForest {
    pub fn new(link_id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            link_id: link_id.into(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Comments at this level
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.items.iter().filter_map(Item::as_comment)
    }

    /// Placeholders at this level
    pub fn placeholders(&self) -> impl Iterator<Item = &MoreComments> {
        self.items.iter().filter_map(Item::as_more)
    }

    /// Number of placeholders anywhere in the tree
    pub fn placeholder_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::More(_) => 1,
                Item::Comment(c) => c.replies.placeholder_count(),
                _ => 0,
            })
            .sum()
    }

    /// All comments of the tree, depth first
    pub fn flatten(&self) -> Vec<&Comment> {
        let mut out = Vec::new();
        collect_comments(self, &mut out);
        out
    }
}

fn collect_comments<'a>(forest: &'a CommentForest, out: &mut Vec<&'a Comment>) {
    for comment in forest.comments() {
        out.push(comment);
        collect_comments(&comment.replies, out);
    }
}

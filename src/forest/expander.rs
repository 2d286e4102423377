//! Placeholder resolution

use crate::endpoints;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::listing::{parse_submission, parse_things, CommentForest};
use crate::models::{Item, MoreComments, Thing};
use crate::pagination::MAX_PAGE_SIZE;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// Replaces "more comments" placeholders with the comments they stand for.
///
/// Child ids are fetched from `/api/morechildren` in batches of at most
/// 100. A batch is only removed from the placeholder once it has been
/// fetched and parsed, so a failed expansion can be retried and picks up
/// where it stopped.
#[derive(Debug, Clone)]
pub struct ForestExpander {
    client: Arc<HttpClient>,
    batch_size: usize,
}

impl ForestExpander {
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            batch_size: MAX_PAGE_SIZE,
        }
    }

    /// Child ids per request, clamped to 1..=100
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Resolve a single placeholder into a fully expanded list of items.
    ///
    /// Comments are arranged under their parents; items whose parent is not
    /// part of the result stay at the top level. A placeholder with nothing
    /// pending resolves to an empty list without any request.
    pub async fn resolve(&self, more: &mut MoreComments) -> Result<Vec<Item>> {
        self.fetch_pending(more).await?;
        let items = assemble(std::mem::take(&mut more.resolved));
        self.expand_resolved(more, items).await
    }

    /// Load the comments behind a "continue this thread" link.
    ///
    /// The parent comment is fetched on its own page and its replies are
    /// expanded like any other resolved batch. [`resolve`](Self::resolve)
    /// and [`expand`](Self::expand) never follow these links.
    pub async fn continue_thread(&self, more: &mut MoreComments) -> Result<Vec<Item>> {
        if more.resolved.is_empty() {
            self.fetch_thread(more).await?;
        }
        let items = std::mem::take(&mut more.resolved);
        self.expand_resolved(more, items).await
    }

    async fn expand_resolved(
        &self,
        more: &mut MoreComments,
        items: Vec<Item>,
    ) -> Result<Vec<Item>> {
        let mut forest = CommentForest::new(more.link_id.clone(), items);
        if let Err(e) = self.expand(&mut forest).await {
            more.resolved = forest.items;
            return Err(e);
        }
        Ok(forest.items)
    }

    /// Expand every placeholder of a tree, depth first.
    ///
    /// On error the tree keeps everything resolved so far and the failing
    /// placeholder keeps its remaining ids.
    pub fn expand<'a>(&'a self, forest: &'a mut CommentForest) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut index = 0;
            while index < forest.items.len() {
                match &mut forest.items[index] {
                    Item::Comment(comment) => {
                        self.expand(&mut comment.replies).await?;
                        index += 1;
                    }
                    Item::More(more) => {
                        if more.link_id.is_empty() {
                            more.link_id = forest.link_id.clone();
                        }
                        let resolved = self.resolve(more).await?;
                        let count = resolved.len();
                        forest.items.splice(index..=index, resolved);
                        index += count;
                    }
                    _ => index += 1,
                }
            }
            Ok(())
        })
    }

    async fn fetch_pending(&self, more: &mut MoreComments) -> Result<()> {
        while more.has_pending() {
            let take = more.children.len().min(self.batch_size);
            let request = RequestConfig::new()
                .query("children", more.children[..take].join(","))
                .query("link_id", more.link_id.as_str())
                .query("id", more.id.as_str())
                .query("depth", more.depth.to_string());

            let body = self
                .client
                .get(endpoints::MORE_CHILDREN, request)
                .await?;
            let items = parse_things(&body, Some(&more.link_id))?;

            debug!(
                placeholder = %more.id,
                requested = take,
                received = items.len(),
                remaining = more.children.len() - take,
                "resolved placeholder batch"
            );
            more.children.drain(..take);
            more.resolved.extend(items);
        }
        Ok(())
    }

    async fn fetch_thread(&self, more: &mut MoreComments) -> Result<()> {
        if more.link_id.is_empty() || !more.parent_id.starts_with("t1_") {
            return Ok(());
        }

        let path = endpoints::comment_thread(&more.link_id, &more.parent_id);
        let body = self.client.get(&path, RequestConfig::new()).await?;
        let (_, forest) = parse_submission(&body)?;

        let replies = forest.items.into_iter().find_map(|item| match item {
            Item::Comment(comment) if comment.fullname() == more.parent_id => {
                Some(comment.replies.items)
            }
            _ => None,
        });
        debug!(parent = %more.parent_id, "continued thread");
        more.resolved = replies.unwrap_or_default();
        Ok(())
    }
}

/// Arrange a flat batch into a tree by `parent_id`
fn assemble(items: Vec<Item>) -> Vec<Item> {
    let mut roots: Vec<Item> = Vec::new();
    for item in items {
        let parent = match &item {
            Item::Comment(comment) => comment.parent_id.clone(),
            Item::More(more) => more.parent_id.clone(),
            _ => String::new(),
        };
        if parent.is_empty() {
            roots.push(item);
            continue;
        }
        if let Err(item) = attach(&mut roots, &parent, item) {
            roots.push(item);
        }
    }
    roots
}

/// Append `child` to the replies of the comment named `parent`; gives the
/// child back when no such comment exists
fn attach(items: &mut [Item], parent: &str, child: Item) -> std::result::Result<(), Item> {
    let mut child = child;
    for item in items.iter_mut() {
        let Item::Comment(comment) = item else {
            continue;
        };
        if comment.fullname() == parent {
            comment.replies.items.push(child);
            return Ok(());
        }
        match attach(&mut comment.replies.items, parent, child) {
            Ok(()) => return Ok(()),
            Err(returned) => child = returned,
        }
    }
    Err(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Comment;

    fn comment(id: &str, parent: &str) -> Item {
        Item::Comment(Box::new(Comment {
            id: id.to_string(),
            name: format!("t1_{id}"),
            parent_id: parent.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_assemble_nests_by_parent() {
        let tree = assemble(vec![
            comment("a", "t3_post"),
            comment("b", "t1_a"),
            comment("c", "t1_b"),
            comment("d", "t3_post"),
            comment("e", "t1_zz"),
        ]);

        let top: Vec<&str> = tree.iter().map(Item::id).collect();
        assert_eq!(top, vec!["a", "d", "e"]);

        let forest = CommentForest::new("t3_post", tree);
        let order: Vec<&str> = forest.flatten().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_assemble_keeps_placeholders_under_parent() {
        let placeholder = Item::More(MoreComments {
            id: "m".to_string(),
            parent_id: "t1_a".to_string(),
            children: vec!["x".to_string()],
            ..Default::default()
        });
        let tree = assemble(vec![comment("a", "t3_post"), placeholder]);

        assert_eq!(tree.len(), 1);
        let forest = CommentForest::new("t3_post", tree);
        assert_eq!(forest.placeholder_count(), 1);
    }
}

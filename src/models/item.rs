//! Typed entities materialized from listing records
//!
//! Field names follow the API payload. Every struct is `#[serde(default)]`
//! so absent or null fields fall back to empty strings, zero or `None`.

use super::kind::{prepend_kind, Kind};
use crate::listing::{CommentForest, Listing};
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Convert an epoch-seconds field into a timestamp
pub(crate) fn timestamp(secs: Option<f64>) -> Option<DateTime<Utc>> {
    let secs = secs?;
    let whole = secs.trunc() as i64;
    let nanos = (secs.fract() * 1e9) as u32;
    DateTime::from_timestamp(whole, nanos)
}

// ============================================================================
// Entities
// ============================================================================

/// A submission (`t3`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub name: String,
    pub title: String,
    pub author: String,
    pub subreddit: String,
    pub selftext: String,
    pub url: String,
    pub permalink: String,
    pub domain: String,
    pub score: i64,
    pub num_comments: u64,
    pub is_self: bool,
    pub over_18: bool,
    pub stickied: bool,
    pub created_utc: Option<f64>,
}

impl Post {
    /// Creation time
    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.created_utc)
    }
}

/// A comment (`t1`) with its reply tree already materialized
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: String,
    pub name: String,
    pub body: String,
    pub author: String,
    pub link_id: String,
    pub parent_id: String,
    pub subreddit: String,
    pub permalink: String,
    pub score: i64,
    pub depth: u32,
    pub is_submitter: bool,
    pub stickied: bool,
    pub created_utc: Option<f64>,
    #[serde(skip_deserializing)]
    pub replies: CommentForest,
}

impl Comment {
    /// Creation time
    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.created_utc)
    }

    /// Whether this comment replies directly to the submission
    pub fn is_root(&self) -> bool {
        self.parent_id.starts_with("t3_")
    }
}

/// A subreddit (`t5`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subreddit {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub title: String,
    pub public_description: String,
    pub subscribers: u64,
    pub over18: bool,
    pub created_utc: Option<f64>,
}

/// An account (`t2`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub link_karma: i64,
    pub comment_karma: i64,
    pub is_mod: bool,
    pub is_gold: bool,
    pub created_utc: Option<f64>,
}

impl User {
    /// Creation time
    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.created_utc)
    }
}

/// A moderation log entry (`modaction`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModAction {
    /// Already prefixed, e.g. `ModAction_5e1a...`
    pub id: String,
    pub action: String,
    #[serde(rename = "mod")]
    pub moderator: String,
    pub subreddit: String,
    pub target_fullname: Option<String>,
    pub target_author: Option<String>,
    pub details: Option<String>,
    pub description: Option<String>,
    pub created_utc: Option<f64>,
}

/// A private message (`t4`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub name: String,
    pub author: String,
    pub dest: String,
    pub subject: String,
    pub body: String,
    pub was_comment: bool,
    pub parent_id: Option<String>,
    pub created_utc: Option<f64>,
}

/// One revision of a wiki page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiRevision {
    pub id: String,
    pub page: String,
    pub reason: Option<String>,
    pub timestamp: Option<f64>,
    pub revision_hidden: bool,
    /// Materialized from the nested `t2` record
    #[serde(skip_deserializing)]
    pub author: Option<User>,
}

impl WikiRevision {
    /// Revision time
    pub fn revised(&self) -> Option<DateTime<Utc>> {
        timestamp(self.timestamp)
    }
}

/// Placeholder for replies the API left out of a thread (`more`).
///
/// `children` holds the ids still to fetch. Items fetched by a partially
/// failed expansion are kept in `resolved` so a retry resumes where the
/// failed batch left off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoreComments {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    pub depth: u32,
    pub count: u64,
    pub children: Vec<String>,
    /// Submission the thread belongs to; injected at parse time
    #[serde(skip_deserializing)]
    pub link_id: String,
    #[serde(skip)]
    pub resolved: Vec<Item>,
}

impl MoreComments {
    /// Whether there are child ids left to fetch
    pub fn has_pending(&self) -> bool {
        !self.children.is_empty()
    }

    /// "Continue this thread" links carry no ids and a zero count
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty() && self.count == 0 && self.resolved.is_empty()
    }
}

/// A record of a kind the client does not model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Unknown {
    pub kind: String,
    pub fields: JsonObject,
}

// ============================================================================
// Item
// ============================================================================

/// A materialized listing record
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Item {
    Post(Post),
    Comment(Box<Comment>),
    Subreddit(Subreddit),
    User(User),
    ModAction(ModAction),
    Message(Message),
    WikiRevision(WikiRevision),
    More(MoreComments),
    Listing(Listing),
    Unknown(Unknown),
}

impl Item {
    /// Kind tag of the record this item came from
    pub fn kind(&self) -> Kind {
        match self {
            Item::Post(_) => Kind::Link,
            Item::Comment(_) => Kind::Comment,
            Item::Subreddit(_) => Kind::Subreddit,
            Item::User(_) => Kind::Account,
            Item::ModAction(_) => Kind::ModAction,
            Item::Message(_) => Kind::Message,
            Item::WikiRevision(_) => Kind::WikiRevision,
            Item::More(_) => Kind::More,
            Item::Listing(_) => Kind::Listing,
            Item::Unknown(u) => Kind::from_tag(&u.kind),
        }
    }

    /// Bare id, empty for nested listings
    pub fn id(&self) -> &str {
        match self {
            Item::Post(p) => &p.id,
            Item::Comment(c) => &c.id,
            Item::Subreddit(s) => &s.id,
            Item::User(u) => &u.id,
            Item::ModAction(m) => &m.id,
            Item::Message(m) => &m.id,
            Item::WikiRevision(w) => &w.id,
            Item::More(m) => &m.id,
            Item::Listing(_) => "",
            Item::Unknown(u) => u.fields.get("id").and_then(|v| v.as_str()).unwrap_or(""),
        }
    }

    /// Kind-prefixed id used as pagination cursor and dedup key.
    ///
    /// `None` for records that carry no id at all.
    pub fn fullname(&self) -> Option<String> {
        let fullname = match self {
            Item::Post(p) => fullname_or_prefixed(&p.name, &p.id, "t3"),
            Item::Comment(c) => fullname_or_prefixed(&c.name, &c.id, "t1"),
            Item::Subreddit(s) => fullname_or_prefixed(&s.name, &s.id, "t5"),
            Item::User(u) => prepend_kind(&u.id, "t2"),
            Item::ModAction(m) => m.id.clone(),
            Item::Message(m) => fullname_or_prefixed(&m.name, &m.id, "t4"),
            Item::WikiRevision(w) => prepend_kind(&w.id, "WikiRevision"),
            Item::More(m) => fullname_or_prefixed(&m.name, &m.id, "more"),
            Item::Listing(_) => return None,
            Item::Unknown(u) => match u.fields.get("name").and_then(|v| v.as_str()) {
                Some(name) => name.to_string(),
                None => prepend_kind(self.id(), &u.kind),
            },
        };
        if fullname.is_empty() || fullname.ends_with('_') {
            return None;
        }
        Some(fullname)
    }

    /// Whether this is a "more items" placeholder
    pub fn is_more(&self) -> bool {
        matches!(self, Item::More(_))
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            Item::Post(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Item::Comment(c) => Some(c.as_ref()),
            _ => None,
        }
    }

    pub fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match self {
            Item::Comment(c) => Some(c.as_mut()),
            _ => None,
        }
    }

    pub fn as_subreddit(&self) -> Option<&Subreddit> {
        match self {
            Item::Subreddit(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Item::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_mod_action(&self) -> Option<&ModAction> {
        match self {
            Item::ModAction(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Item::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_wiki_revision(&self) -> Option<&WikiRevision> {
        match self {
            Item::WikiRevision(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_more(&self) -> Option<&MoreComments> {
        match self {
            Item::More(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_listing(&self) -> Option<&Listing> {
        match self {
            Item::Listing(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Unknown> {
        match self {
            Item::Unknown(u) => Some(u),
            _ => None,
        }
    }
}

/// The API-supplied `name`, or the id prefixed with `kind` when it is missing
pub(crate) fn fullname_or_prefixed(name: &str, id: &str, kind: &str) -> String {
    if name.is_empty() {
        prepend_kind(id, kind)
    } else {
        name.to_string()
    }
}

/// Serialized as `{"kind": <tag>, "data": <entity>}`, the shape records arrive in
impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Item", 2)?;
        state.serialize_field("kind", self.kind().as_str())?;
        match self {
            Item::Post(p) => state.serialize_field("data", p)?,
            Item::Comment(c) => state.serialize_field("data", c)?,
            Item::Subreddit(s) => state.serialize_field("data", s)?,
            Item::User(u) => state.serialize_field("data", u)?,
            Item::ModAction(m) => state.serialize_field("data", m)?,
            Item::Message(m) => state.serialize_field("data", m)?,
            Item::WikiRevision(w) => state.serialize_field("data", w)?,
            Item::More(m) => state.serialize_field("data", m)?,
            Item::Listing(l) => state.serialize_field("data", l)?,
            Item::Unknown(u) => state.serialize_field("data", &u.fields)?,
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_defaults_missing_fields() {
        let post: Post = serde_json::from_value(json!({"id": "abc", "title": "hi"})).unwrap();
        assert_eq!(post.id, "abc");
        assert_eq!(post.author, "");
        assert_eq!(post.score, 0);
        assert!(!post.is_self);
        assert!(post.created().is_none());
    }

    #[test]
    fn test_created_timestamp() {
        let post: Post =
            serde_json::from_value(json!({"id": "abc", "created_utc": 1_600_000_000.5})).unwrap();
        let created = post.created().unwrap();
        assert_eq!(created.timestamp(), 1_600_000_000);
        assert_eq!(created.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_mod_action_renames_mod_field() {
        let action: ModAction = serde_json::from_value(json!({
            "id": "ModAction_1",
            "action": "removelink",
            "mod": "automoderator"
        }))
        .unwrap();
        assert_eq!(action.moderator, "automoderator");
        assert_eq!(Item::ModAction(action).fullname().as_deref(), Some("ModAction_1"));
    }

    #[test]
    fn test_fullname_falls_back_to_prefixed_id() {
        let post = Post {
            id: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(Item::Post(post).fullname().as_deref(), Some("t3_abc"));

        let user = User {
            id: "u1".to_string(),
            name: "alice".to_string(),
            ..Default::default()
        };
        assert_eq!(Item::User(user).fullname().as_deref(), Some("t2_u1"));
    }

    #[test]
    fn test_fullname_absent_without_id() {
        assert!(Item::Listing(Listing::default()).fullname().is_none());
        assert!(Item::Post(Post::default()).fullname().is_none());
    }

    #[test]
    fn test_unknown_item_identity() {
        let mut fields = JsonObject::new();
        fields.insert("id".to_string(), json!("x1"));
        let item = Item::Unknown(Unknown {
            kind: "t6".to_string(),
            fields,
        });
        assert_eq!(item.kind(), Kind::Award);
        assert_eq!(item.id(), "x1");
        assert_eq!(item.fullname().as_deref(), Some("t6_x1"));
    }

    #[test]
    fn test_item_serializes_with_kind_tag() {
        let item = Item::Post(Post {
            id: "abc".to_string(),
            title: "hello".to_string(),
            ..Default::default()
        });
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "t3");
        assert_eq!(value["data"]["title"], "hello");
    }

    #[test]
    fn test_continue_thread_placeholder() {
        let more = MoreComments {
            id: "_".to_string(),
            ..Default::default()
        };
        assert!(more.is_continue_thread());
        assert!(!more.has_pending());
    }
}

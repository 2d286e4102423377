//! Kind-tagged dispatch of raw records
//!
//! Every record of a page is `{kind, data}`; the kind selects a builder from
//! a single lookup table. Kinds without a builder become [`Item::Unknown`]
//! so a new record type never breaks a page. Wiki revisions arrive without a
//! kind and are recognized by their `page` field.
//!
//! Parsing is pure: the same payload always yields the same items.

use super::types::{CommentForest, Listing};
use crate::error::{Error, Result};
use crate::models::{
    Comment, Item, Message, ModAction, MoreComments, Post, Subreddit, Thing, Unknown, User,
    WikiRevision,
};
use crate::types::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

type Builder = fn(&JsonObject, Option<&str>) -> Result<Item>;

static BUILDERS: LazyLock<HashMap<&'static str, Builder>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Builder> = HashMap::new();
    m.insert("t1", build_comment);
    m.insert("t2", build_user);
    m.insert("t3", build_post);
    m.insert("t4", build_message);
    m.insert("t5", build_subreddit);
    m.insert("modaction", build_mod_action);
    m.insert("Listing", build_listing);
    m.insert("more", build_more);
    m
});

// ============================================================================
// Entry points
// ============================================================================

/// Parse a listing payload.
///
/// Accepts the `{kind: "Listing", data: {children, after, before}}` wrapper
/// as well as a bare `{data: {children}}`.
pub fn parse_listing(value: &Value) -> Result<Listing> {
    parse_listing_in(value, None)
}

/// Parse one `{kind, data}` record.
///
/// `link_id` is the submission a comment thread belongs to; it is injected
/// into placeholders and inherited by nested replies.
pub fn parse_item(raw: &Value, link_id: Option<&str>) -> Result<Item> {
    let record = raw
        .as_object()
        .ok_or_else(|| Error::parse("listing record is not an object"))?;

    if record.contains_key("page") {
        return build_wiki_revision(record);
    }

    let kind = record
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::parse("listing record has no kind"))?;
    let data = record.get("data").and_then(Value::as_object);

    match BUILDERS.get(kind) {
        Some(build) => {
            let data =
                data.ok_or_else(|| Error::parse(format!("{kind} record has no data object")))?;
            build(data, link_id)
        }
        None => Ok(Item::Unknown(Unknown {
            kind: kind.to_string(),
            fields: data.cloned().unwrap_or_default(),
        })),
    }
}

/// Parse an action response of the form `{json: {errors, data: {things}}}`.
///
/// A non-empty `errors` list is reported as an API error with status 200.
pub fn parse_things(value: &Value, link_id: Option<&str>) -> Result<Vec<Item>> {
    let json = value
        .get("json")
        .ok_or_else(|| Error::parse("response has no json object"))?;

    if let Some(errors) = json.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            return Err(Error::api(200, Value::Array(errors.clone()).to_string()));
        }
    }

    let things = json
        .get("data")
        .and_then(|data| data.get("things"))
        .and_then(Value::as_array)
        .ok_or_else(|| Error::parse("response has no json.data.things"))?;

    things.iter().map(|thing| parse_item(thing, link_id)).collect()
}

/// Parse a `/comments/{id}` response: the submission and its comment tree
pub fn parse_submission(value: &Value) -> Result<(Post, CommentForest)> {
    let pages = value
        .as_array()
        .filter(|pages| pages.len() == 2)
        .ok_or_else(|| Error::parse("submission response is not a pair of listings"))?;

    let post = parse_listing(&pages[0])?
        .into_iter()
        .find_map(|item| match item {
            Item::Post(post) => Some(post),
            _ => None,
        })
        .ok_or_else(|| Error::parse("submission listing holds no post"))?;

    let link_id = post.fullname();
    let comments = parse_listing_in(&pages[1], Some(&link_id))?;
    Ok((post, CommentForest::new(link_id, comments.items)))
}

// ============================================================================
// Builders
// ============================================================================

fn parse_listing_in(value: &Value, link_id: Option<&str>) -> Result<Listing> {
    let data = value
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::parse("listing payload has no data object"))?;
    listing_from_data(data, link_id)
}

fn listing_from_data(data: &JsonObject, link_id: Option<&str>) -> Result<Listing> {
    let children = data
        .get("children")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::parse("listing payload has no data.children"))?;

    let items = children
        .iter()
        .map(|child| parse_item(child, link_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(Listing {
        items,
        after: string_field(data, "after"),
        before: string_field(data, "before"),
    })
}

fn string_field(data: &JsonObject, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Deserialize an entity, treating null fields as absent
fn from_fields<T: DeserializeOwned>(data: &JsonObject, kind: &str) -> Result<T> {
    let present: JsonObject = data
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    serde_json::from_value(Value::Object(present))
        .map_err(|e| Error::parse(format!("malformed {kind} record: {e}")))
}

fn build_post(data: &JsonObject, _link_id: Option<&str>) -> Result<Item> {
    Ok(Item::Post(from_fields(data, "t3")?))
}

fn build_user(data: &JsonObject, _link_id: Option<&str>) -> Result<Item> {
    Ok(Item::User(from_fields::<User>(data, "t2")?))
}

fn build_subreddit(data: &JsonObject, _link_id: Option<&str>) -> Result<Item> {
    Ok(Item::Subreddit(from_fields::<Subreddit>(data, "t5")?))
}

fn build_message(data: &JsonObject, _link_id: Option<&str>) -> Result<Item> {
    Ok(Item::Message(from_fields::<Message>(data, "t4")?))
}

fn build_mod_action(data: &JsonObject, _link_id: Option<&str>) -> Result<Item> {
    Ok(Item::ModAction(from_fields::<ModAction>(data, "modaction")?))
}

fn build_listing(data: &JsonObject, link_id: Option<&str>) -> Result<Item> {
    Ok(Item::Listing(listing_from_data(data, link_id)?))
}

fn build_comment(data: &JsonObject, link_id: Option<&str>) -> Result<Item> {
    let mut comment: Comment = from_fields(data, "t1")?;
    if comment.link_id.is_empty() {
        comment.link_id = link_id.unwrap_or_default().to_string();
    }

    // Replies are "" when there are none, otherwise a full listing
    let replies = match data.get("replies") {
        Some(replies @ Value::Object(_)) => {
            parse_listing_in(replies, Some(&comment.link_id))?.items
        }
        _ => Vec::new(),
    };
    comment.replies = CommentForest::new(comment.link_id.clone(), replies);
    Ok(Item::Comment(Box::new(comment)))
}

fn build_more(data: &JsonObject, link_id: Option<&str>) -> Result<Item> {
    let mut more: MoreComments = from_fields(data, "more")?;
    more.link_id = link_id.unwrap_or_default().to_string();
    Ok(Item::More(more))
}

fn build_wiki_revision(record: &JsonObject) -> Result<Item> {
    let mut revision: WikiRevision = from_fields(record, "WikiRevision")?;
    if let Some(author) = record.get("author").filter(|a| a.is_object()) {
        if let Item::User(user) = parse_item(author, None)? {
            revision.author = Some(user);
        }
    }
    Ok(Item::WikiRevision(revision))
}

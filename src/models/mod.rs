//! Typed entities
//!
//! Records of a listing are materialized into one [`Item`] variant per kind,
//! and entities opt into the actions the API offers on them through the
//! capability traits.

mod capabilities;
mod item;
mod kind;

pub use capabilities::{
    Deletable, Hideable, Replyable, Savable, Thing, Votable, VoteDirection,
};
pub use item::{
    Comment, Item, Message, ModAction, MoreComments, Post, Subreddit, Unknown, User,
    WikiRevision,
};
pub use kind::{prepend_kind, Kind};

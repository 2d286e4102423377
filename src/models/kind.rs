//! Kind tags and fullnames

use serde::{Deserialize, Serialize};

/// Discriminator carried by every record of a listing payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    /// `t1`
    Comment,
    /// `t2`
    Account,
    /// `t3`
    Link,
    /// `t4`
    Message,
    /// `t5`
    Subreddit,
    /// `t6`
    Award,
    /// `modaction`
    ModAction,
    /// `Listing`
    Listing,
    /// `more`
    More,
    /// `WikiRevision`
    WikiRevision,
    /// Any tag the client does not model
    Other(String),
}

impl Kind {
    /// Wire tag of this kind
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Comment => "t1",
            Kind::Account => "t2",
            Kind::Link => "t3",
            Kind::Message => "t4",
            Kind::Subreddit => "t5",
            Kind::Award => "t6",
            Kind::ModAction => "modaction",
            Kind::Listing => "Listing",
            Kind::More => "more",
            Kind::WikiRevision => "WikiRevision",
            Kind::Other(tag) => tag,
        }
    }

    /// Parse a wire tag; unrecognized tags become [`Kind::Other`]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "t1" => Kind::Comment,
            "t2" => Kind::Account,
            "t3" => Kind::Link,
            "t4" => Kind::Message,
            "t5" => Kind::Subreddit,
            "t6" => Kind::Award,
            "modaction" => Kind::ModAction,
            "Listing" => Kind::Listing,
            "more" => Kind::More,
            "WikiRevision" => Kind::WikiRevision,
            other => Kind::Other(other.to_string()),
        }
    }
}

impl From<String> for Kind {
    fn from(tag: String) -> Self {
        Kind::from_tag(&tag)
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::str::FromStr for Kind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Kind::from_tag(s))
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a fullname from an id and a kind tag.
///
/// Ids that already carry the `{kind}_` prefix are returned unchanged.
pub fn prepend_kind(id: &str, kind: &str) -> String {
    let prefix = format!("{kind}_");
    if id.starts_with(&prefix) {
        id.to_string()
    } else {
        format!("{prefix}{id}")
    }
}

//! API endpoint paths

/// Bearer-token introspection of the logged-in account
pub const ME: &str = "/api/v1/me";
/// Look up items by fullname
pub const INFO: &str = "/api/info";
/// Fetch truncated comment children
pub const MORE_CHILDREN: &str = "/api/morechildren";

pub const VOTE: &str = "/api/vote";
pub const DELETE: &str = "/api/del";
pub const HIDE: &str = "/api/hide";
pub const UNHIDE: &str = "/api/unhide";
pub const SAVE: &str = "/api/save";
pub const UNSAVE: &str = "/api/unsave";
pub const COMMENT: &str = "/api/comment";

/// Newest submissions of a subreddit
pub fn subreddit_new(subreddit: &str) -> String {
    format!("/r/{subreddit}/new")
}

/// Hot submissions of a subreddit
pub fn subreddit_hot(subreddit: &str) -> String {
    format!("/r/{subreddit}/hot")
}

/// Newest comments across a subreddit
pub fn subreddit_comments(subreddit: &str) -> String {
    format!("/r/{subreddit}/comments")
}

/// Moderation log of a subreddit
pub fn subreddit_modlog(subreddit: &str) -> String {
    format!("/r/{subreddit}/about/log")
}

/// Revision history of a wiki page
pub fn wiki_revisions(subreddit: &str, page: &str) -> String {
    format!("/r/{subreddit}/wiki/revisions/{page}")
}

/// Comments written by a user
pub fn user_comments(username: &str) -> String {
    format!("/user/{username}/comments")
}

/// Submissions made by a user
pub fn user_submissions(username: &str) -> String {
    format!("/user/{username}/submitted")
}

/// A submission together with its comment tree
pub fn submission(id: &str) -> String {
    let id = id.strip_prefix("t3_").unwrap_or(id);
    format!("/comments/{id}")
}

/// One comment of a submission with its replies; resolves "continue this thread"
pub fn comment_thread(link_id: &str, comment_id: &str) -> String {
    let link_id = link_id.strip_prefix("t3_").unwrap_or(link_id);
    let comment_id = comment_id.strip_prefix("t1_").unwrap_or(comment_id);
    format!("/comments/{link_id}/_/{comment_id}")
}

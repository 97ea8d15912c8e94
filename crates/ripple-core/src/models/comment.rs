//! Comment model

use serde::{Deserialize, Serialize};

use super::PostId;

/// A comment on a post. Immutable once created; no edit or delete exists.
///
/// The sequence number is unique within the parent post and monotonically
/// increasing. Whichever party first durably records a comment assigns it;
/// on conflict the authoritative store's assignment wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Author identity token
    pub author: String,
    /// Body text
    pub body: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Sequence number within the parent post
    pub seq: u64,
}

/// Names one comment by parent post and sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentRef {
    pub post: PostId,
    pub seq: u64,
}

//! Post model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Comment;

/// A unique identifier for a post, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    /// Create a new unique post ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A post in the shared feed.
///
/// The id and creation timestamp are assigned once and never change; the
/// like set and comment sequence are the only mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: PostId,
    /// Author identity token
    pub author: String,
    /// Body text
    pub body: String,
    /// Creation timestamp (Unix ms), immutable
    pub created_at: i64,
    /// Liker identities in arrival order, each at most once
    pub likes: Vec<String>,
    /// Comments in ascending sequence order
    pub comments: Vec<Comment>,
}

impl Post {
    /// Create a post with empty likes and comments.
    #[must_use]
    pub fn new(id: PostId, author: impl Into<String>, body: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            author: author.into(),
            body: body.into(),
            created_at,
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Check whether `identity` is in the like set.
    #[must_use]
    pub fn liked_by(&self, identity: &str) -> bool {
        self.likes.iter().any(|liker| liker == identity)
    }

    #[must_use]
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Next free comment sequence number (max existing + 1, starting at 1).
    #[must_use]
    pub fn next_comment_seq(&self) -> u64 {
        self.comments.iter().map(|comment| comment.seq).max().unwrap_or(0) + 1
    }

    /// Look up a comment by sequence number.
    #[must_use]
    pub fn comment(&self, seq: u64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.seq == seq)
    }
}

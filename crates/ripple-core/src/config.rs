//! Runtime configuration for the synchronization core.
//!
//! Every knob is an explicit constructor parameter; nothing here reads the
//! environment or any other ambient state.

/// Size limits for the in-memory feed. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedConfig {
    /// Maximum number of posts retained. Inserting beyond the cap evicts
    /// the oldest-created post.
    pub max_posts: Option<usize>,
    /// Maximum comments accepted per post. Further comments are refused.
    pub max_comments_per_post: Option<usize>,
}

impl FeedConfig {
    /// No limits at all, matching the default.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_posts: None,
            max_comments_per_post: None,
        }
    }
}

//! Data model shared across the synchronization core.

mod comment;
mod post;

pub use comment::{Comment, CommentRef};
pub use post::{Post, PostId};

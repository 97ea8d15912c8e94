//! ripple-core - Core library for Ripple
//!
//! An in-process realtime feed synchronization core: a single source of
//! truth for posts, likes, and comments ([`FeedStore`]), synchronous
//! observer fan-out ([`hub::SubscriptionHub`]), and optimistic local
//! mutation with remote reconciliation ([`optimistic::OptimisticMutator`]).
//!
//! [`FeedSession`] ties the three together behind an identity gate and a
//! submission channel to the external persistence collaborator.

pub mod config;
pub mod error;
pub mod hub;
pub mod mention;
pub mod models;
pub mod optimistic;
pub mod presence;
pub mod remote;
pub mod session;
pub mod store;

pub use config::FeedConfig;
pub use error::{Error, Result};
pub use models::{Comment, CommentRef, Post, PostId};
pub use session::FeedSession;
pub use store::{FeedSnapshot, FeedStore};

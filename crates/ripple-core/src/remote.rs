//! Remote boundary: authoritative events, acknowledgments, and the sync
//! driver.
//!
//! The persistence collaborator itself is out of scope; this module defines
//! the types crossing the boundary and a driver task that serializes every
//! inbound delivery through the session lock, keeping the store
//! single-writer-apparent no matter how late or out of order the
//! collaborator's messages arrive.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;

use crate::models::{Comment, Post, PostId};
use crate::optimistic::{CorrelationId, Intent};
use crate::session::FeedSession;

/// Authoritative change notification from the persistence collaborator.
///
/// May arrive redundantly or out of order; the store merges it
/// idempotently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteEvent {
    PostAdded { post: Post },
    LikeSet { post: PostId, identity: String, liked: bool },
    CommentAdded { post: PostId, comment: Comment },
}

/// Authoritative result reconciled into a confirmed intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOutcome {
    Post { id: PostId },
    Like { liked: bool },
    Comment { seq: u64, created_at: i64 },
}

/// Reply to a submitted intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteReply {
    Ack {
        correlation: CorrelationId,
        outcome: RemoteOutcome,
    },
    Reject {
        correlation: CorrelationId,
        reason: String,
    },
}

/// An intent on its way to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub correlation: CorrelationId,
    pub intent: Intent,
}

/// Shared handle to a session; the mutex serializes all mutations.
pub type SharedSession = Arc<Mutex<FeedSession>>;

/// Pumps remote deliveries into the session, one at a time.
///
/// Errors from individual deliveries (an event for a post we never saw, an
/// ack for an already-cancelled intent) are logged and dropped; they must
/// not stop the stream.
pub struct SyncDriver {
    events: UnboundedReceiver<RemoteEvent>,
    replies: UnboundedReceiver<RemoteReply>,
}

impl SyncDriver {
    #[must_use]
    pub fn new(
        events: UnboundedReceiver<RemoteEvent>,
        replies: UnboundedReceiver<RemoteReply>,
    ) -> Self {
        Self { events, replies }
    }

    /// Run until both inbound channels close.
    pub async fn run(mut self, session: SharedSession) {
        let mut events_open = true;
        let mut replies_open = true;

        while events_open || replies_open {
            tokio::select! {
                event = self.events.recv(), if events_open => {
                    match event {
                        Some(event) => Self::apply_event(&session, event).await,
                        None => events_open = false,
                    }
                }
                reply = self.replies.recv(), if replies_open => {
                    match reply {
                        Some(reply) => Self::apply_reply(&session, reply).await,
                        None => replies_open = false,
                    }
                }
            }
        }
        tracing::debug!("sync driver finished: remote channels closed");
    }

    async fn apply_event(session: &SharedSession, event: RemoteEvent) {
        let mut session = session.lock().await;
        if let Err(error) = session.apply_remote(event) {
            tracing::warn!("discarding remote event: {error}");
        }
    }

    async fn apply_reply(session: &SharedSession, reply: RemoteReply) {
        let mut session = session.lock().await;
        let result = match reply {
            RemoteReply::Ack { correlation, outcome } => session.confirm(correlation, &outcome),
            RemoteReply::Reject { correlation, reason } => session.reject(correlation, &reason),
        };
        if let Err(error) = result {
            tracing::warn!("discarding remote reply: {error}");
        }
    }
}

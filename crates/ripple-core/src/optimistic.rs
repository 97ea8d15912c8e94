//! Optimistic local mutation with remote reconciliation.
//!
//! An intent is applied to the store immediately, tagged with a correlation
//! id, and submitted to the persistence collaborator by the session. When
//! the round-trip completes the intent is either confirmed (authoritative
//! identifiers rewritten in place) or rejected (exactly its own delta rolled
//! back, re-derived against current state rather than restored from a stale
//! snapshot).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{CommentRef, PostId};
use crate::remote::RemoteOutcome;
use crate::store::FeedStore;

/// Correlation id tying an optimistic application to its remote round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A local actor's requested mutation, before authoritative confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    CreatePost { author: String, body: String },
    ToggleLike { post: PostId, identity: String },
    AddComment { post: PostId, author: String, body: String },
}

/// Result of an optimistic application, before confirmation.
///
/// Identifiers in here are placeholders; the authoritative store may assign
/// different ones during confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proposed {
    Post {
        correlation: CorrelationId,
        placeholder: PostId,
    },
    Like {
        correlation: CorrelationId,
        liked: bool,
    },
    Comment {
        correlation: CorrelationId,
        reference: CommentRef,
    },
}

impl Proposed {
    #[must_use]
    pub const fn correlation(&self) -> CorrelationId {
        match self {
            Self::Post { correlation, .. }
            | Self::Like { correlation, .. }
            | Self::Comment { correlation, .. } => *correlation,
        }
    }
}

/// The state delta recorded when an intent was applied optimistically.
///
/// Comments are keyed by creation timestamp, not sequence number: a merge
/// can renumber the optimistic comment while the round-trip is still in
/// flight, and the delta must keep identifying it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AppliedDelta {
    Post {
        placeholder: PostId,
    },
    Like {
        post: PostId,
        identity: String,
        added: bool,
    },
    Comment {
        post: PostId,
        author: String,
        created_at: i64,
    },
}

#[derive(Debug)]
struct PendingIntent {
    correlation: CorrelationId,
    delta: AppliedDelta,
}

/// Applies local intents immediately and reconciles them against the
/// authoritative acknowledgment later.
///
/// Holds no copy of feed truth, only the transient pending deltas; the
/// store stays the single source of truth and is passed in by the caller.
#[derive(Debug, Default)]
pub struct OptimisticMutator {
    pending: Vec<PendingIntent>,
}

impl OptimisticMutator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `intent` to the store optimistically and record its delta.
    ///
    /// Returns synchronously with the placeholder result and a fresh
    /// correlation id. On error nothing is applied and nothing is pending.
    pub fn propose(&mut self, store: &mut FeedStore, intent: &Intent) -> Result<Proposed> {
        let correlation = CorrelationId::new();
        let (proposed, delta) = match intent {
            Intent::CreatePost { author, body } => {
                let placeholder = store.create_post(author.clone(), body.clone())?;
                (
                    Proposed::Post {
                        correlation,
                        placeholder,
                    },
                    AppliedDelta::Post { placeholder },
                )
            }
            Intent::ToggleLike { post, identity } => {
                let added = store.toggle_like(*post, identity.clone())?;
                (
                    Proposed::Like {
                        correlation,
                        liked: added,
                    },
                    AppliedDelta::Like {
                        post: *post,
                        identity: identity.clone(),
                        added,
                    },
                )
            }
            Intent::AddComment { post, author, body } => {
                let reference = store.add_comment(*post, author.clone(), body.clone())?;
                let created_at = store
                    .get_post(*post)?
                    .comment(reference.seq)
                    .ok_or_else(|| Error::NotFound(format!("comment {} on {post}", reference.seq)))?
                    .created_at;
                (
                    Proposed::Comment {
                        correlation,
                        reference,
                    },
                    AppliedDelta::Comment {
                        post: *post,
                        author: author.clone(),
                        created_at,
                    },
                )
            }
        };

        tracing::debug!(correlation = %correlation, "intent applied optimistically");
        self.pending.push(PendingIntent { correlation, delta });
        Ok(proposed)
    }

    /// Reconcile the authoritative acknowledgment for a pending intent.
    ///
    /// Placeholder identifiers are rewritten in place; a follow-up event is
    /// emitted only when the visible shape changed. Confirming a post also
    /// remaps its placeholder id inside every other pending delta, so likes
    /// and comments proposed against the placeholder stay resolvable. The
    /// intent stays pending if reconciliation itself fails, so the caller
    /// can retry.
    pub fn confirm(
        &mut self,
        store: &mut FeedStore,
        correlation: CorrelationId,
        outcome: &RemoteOutcome,
    ) -> Result<()> {
        let index = self.position(correlation)?;
        let remapped = match (&self.pending[index].delta, outcome) {
            (AppliedDelta::Post { placeholder }, RemoteOutcome::Post { id }) => {
                store.rewrite_post_id(*placeholder, *id)?;
                Some((*placeholder, *id))
            }
            (AppliedDelta::Like { post, identity, .. }, RemoteOutcome::Like { liked }) => {
                store.set_like_state(*post, identity, *liked)?;
                None
            }
            (
                AppliedDelta::Comment {
                    post,
                    author,
                    created_at,
                },
                RemoteOutcome::Comment {
                    seq,
                    created_at: authoritative_created_at,
                },
            ) => {
                store.rewrite_comment_seq(*post, author, *created_at, *seq, *authoritative_created_at)?;
                None
            }
            _ => {
                return Err(Error::InvalidInput(format!(
                    "confirmation outcome does not match pending intent {correlation}"
                )));
            }
        };

        self.pending.remove(index);
        if let Some((placeholder, authoritative)) = remapped {
            self.remap_post_id(placeholder, authoritative);
        }
        tracing::debug!(correlation = %correlation, "intent confirmed");
        Ok(())
    }

    /// Point pending deltas at the authoritative post id once the intent
    /// that created the placeholder is confirmed.
    fn remap_post_id(&mut self, placeholder: PostId, authoritative: PostId) {
        for pending in &mut self.pending {
            match &mut pending.delta {
                AppliedDelta::Like { post, .. } | AppliedDelta::Comment { post, .. }
                    if *post == placeholder =>
                {
                    *post = authoritative;
                }
                _ => {}
            }
        }
    }

    /// Roll back exactly the delta introduced by `correlation`.
    ///
    /// The rollback is re-derived against current state: an optimistic
    /// post or comment is removed only if still present, and a like flip is
    /// inverted only if membership still reflects it. Changes made by other
    /// intents or remote merges in the interim are left alone.
    pub fn reject(
        &mut self,
        store: &mut FeedStore,
        correlation: CorrelationId,
        reason: &str,
    ) -> Result<()> {
        let index = self.position(correlation)?;
        let pending = self.pending.remove(index);
        tracing::warn!(correlation = %correlation, reason, "intent rejected, rolling back");

        match pending.delta {
            AppliedDelta::Post { placeholder } => {
                if store.contains(placeholder) {
                    store.remove_post(placeholder)?;
                }
            }
            AppliedDelta::Like {
                post,
                identity,
                added,
            } => {
                if store.contains(post) {
                    store.set_like_state(post, &identity, !added)?;
                }
            }
            AppliedDelta::Comment {
                post,
                author,
                created_at,
            } => {
                if store.contains(post) {
                    store.remove_comment(post, &author, created_at)?;
                }
            }
        }
        Ok(())
    }

    /// Cancellation by the caller behaves identically to a rejection.
    pub fn cancel(&mut self, store: &mut FeedStore, correlation: CorrelationId) -> Result<()> {
        self.reject(store, correlation, "cancelled by caller")
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, correlation: CorrelationId) -> bool {
        self.pending
            .iter()
            .any(|pending| pending.correlation == correlation)
    }

    fn position(&self, correlation: CorrelationId) -> Result<usize> {
        self.pending
            .iter()
            .position(|pending| pending.correlation == correlation)
            .ok_or_else(|| Error::NotFound(format!("pending intent {correlation}")))
    }
}

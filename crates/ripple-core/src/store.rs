//! `FeedStore` - single source of truth for posts, likes, and comments.
//!
//! All mutation goes through the store's own operations; each one completes
//! its observer fan-out before returning, so callers that serialize access
//! (a `&mut` borrow or the session mutex) get the single-writer-apparent
//! model for free. Remote merges are idempotent and commutative per post
//! because the delivery channel may redeliver events.

use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::hub::{FeedEvent, FeedObserver, ObserverFailure, SubscriptionHub, SubscriptionId};
use crate::models::{Comment, CommentRef, Post, PostId};
use crate::remote::RemoteEvent;

/// Materialized feed view: posts ordered newest-creation-first.
///
/// Always derived from the post collection, never mutated independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
}

impl FeedSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// The authoritative in-memory feed model.
pub struct FeedStore {
    posts: Vec<Post>,
    hub: SubscriptionHub,
    warnings: Vec<ObserverFailure>,
    config: FeedConfig,
    last_timestamp: i64,
}

impl FeedStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FeedConfig::default())
    }

    #[must_use]
    pub fn with_config(config: FeedConfig) -> Self {
        Self {
            posts: Vec::new(),
            hub: SubscriptionHub::new(),
            warnings: Vec::new(),
            config,
            last_timestamp: 0,
        }
    }

    /// Create a post with a fresh id and timestamp. Emits `PostAdded`.
    pub fn create_post(
        &mut self,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<PostId> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(Error::InvalidInput("post body must not be empty".into()));
        }

        let id = PostId::new();
        let created_at = self.next_timestamp();
        self.insert_post(Post::new(id, author.into(), body, created_at));
        Ok(id)
    }

    /// Toggle `identity`'s membership in the post's like set.
    ///
    /// Returns the new membership: `true` when the like was added, `false`
    /// when it was removed. Emits `PostUpdated`.
    pub fn toggle_like(&mut self, post_id: PostId, identity: impl Into<String>) -> Result<bool> {
        let identity = identity.into();
        let post = self.post_mut(post_id)?;

        let liked = if let Some(position) = post.likes.iter().position(|liker| *liker == identity) {
            post.likes.remove(position);
            false
        } else {
            post.likes.push(identity);
            true
        };

        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(liked)
    }

    /// Set like membership to an explicit state.
    ///
    /// Idempotent: returns whether anything changed, and emits `PostUpdated`
    /// only when it did. This is the merge form used for remote deliveries
    /// and reconciliation, where applying the same state twice must not
    /// double-apply.
    pub fn set_like_state(&mut self, post_id: PostId, identity: &str, liked: bool) -> Result<bool> {
        let post = self.post_mut(post_id)?;
        let currently = post.likes.iter().any(|liker| liker == identity);
        if currently == liked {
            return Ok(false);
        }

        if liked {
            post.likes.push(identity.to_string());
        } else {
            post.likes.retain(|liker| liker != identity);
        }

        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(true)
    }

    /// Append a comment with the next free sequence number for the post.
    /// Emits `PostUpdated`.
    pub fn add_comment(
        &mut self,
        post_id: PostId,
        author: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<CommentRef> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(Error::InvalidInput("comment body must not be empty".into()));
        }
        if !self.contains(post_id) {
            return Err(Error::NotFound(post_id.to_string()));
        }

        let created_at = self.next_timestamp();
        let max_comments = self.config.max_comments_per_post;
        let post = self.post_mut(post_id)?;
        if let Some(max) = max_comments {
            if post.comments.len() >= max {
                return Err(Error::InvalidInput(format!("comment limit of {max} reached")));
            }
        }

        let seq = post.next_comment_seq();
        post.comments.push(Comment {
            author: author.into(),
            body,
            created_at,
            seq,
        });

        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(CommentRef { post: post_id, seq })
    }

    /// Merge an authoritative remote event.
    ///
    /// Idempotent and commutative per post: redelivered posts are dropped by
    /// id, likes are set-state, comments are deduplicated by
    /// `(author, seq)`. A sequence-slot collision between different authors
    /// is reconciled, not rejected: the earlier authoritative timestamp
    /// keeps the lower sequence number.
    pub fn apply_remote(&mut self, event: RemoteEvent) -> Result<()> {
        match event {
            RemoteEvent::PostAdded { post } => {
                if self.contains(post.id) {
                    tracing::debug!(post = %post.id, "remote post already present, ignoring redelivery");
                    return Ok(());
                }
                self.observe_timestamp(post.created_at);
                self.insert_post(post);
                Ok(())
            }
            RemoteEvent::LikeSet {
                post,
                identity,
                liked,
            } => self.set_like_state(post, &identity, liked).map(|_| ()),
            RemoteEvent::CommentAdded { post, comment } => self.merge_remote_comment(post, comment),
        }
    }

    /// Snapshot ordered by creation timestamp descending, ties broken by id.
    /// Deterministic regardless of insertion order.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        let mut posts = self.posts.clone();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        FeedSnapshot { posts }
    }

    pub fn get_post(&self, id: PostId) -> Result<&Post> {
        self.posts
            .iter()
            .find(|post| post.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: PostId) -> bool {
        self.posts.iter().any(|post| post.id == id)
    }

    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Register an observer. The current snapshot is delivered synchronously
    /// as a synthetic initial event before this call returns.
    pub fn subscribe(&mut self, observer: Box<dyn FeedObserver>) -> SubscriptionId {
        let initial = FeedEvent::Snapshot(self.snapshot());
        let (id, failure) = self.hub.subscribe(observer, &initial);
        if let Some(failure) = failure {
            tracing::warn!(
                subscription = ?failure.subscription,
                "observer failed on initial snapshot: {}",
                failure.message
            );
            self.warnings.push(failure);
        }
        id
    }

    /// Remove an observer. Safe to call repeatedly.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.hub.unsubscribe(id);
    }

    /// Drain observer failures recorded since the last call.
    ///
    /// This is the non-fatal side channel: a failing observer never aborts
    /// the mutation that triggered it, but the failure stays visible here
    /// (and in the warn-level log) until the caller collects it.
    pub fn take_observer_warnings(&mut self) -> Vec<ObserverFailure> {
        std::mem::take(&mut self.warnings)
    }

    /// Replace a locally-assigned placeholder id with the authoritative one.
    ///
    /// When the authoritative copy already arrived through the remote
    /// channel the placeholder is dropped instead, so the post is never
    /// duplicated.
    pub(crate) fn rewrite_post_id(&mut self, placeholder: PostId, authoritative: PostId) -> Result<()> {
        if placeholder == authoritative {
            return Ok(());
        }
        if self.contains(authoritative) {
            tracing::debug!(
                placeholder = %placeholder,
                authoritative = %authoritative,
                "authoritative post already merged, dropping placeholder"
            );
            return self.remove_post(placeholder);
        }

        let post = self.post_mut(placeholder)?;
        post.id = authoritative;
        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(())
    }

    /// Remove a post outright. Emits `PostRemoved`.
    pub(crate) fn remove_post(&mut self, id: PostId) -> Result<()> {
        let Some(index) = self.posts.iter().position(|post| post.id == id) else {
            return Err(Error::NotFound(id.to_string()));
        };
        self.posts.remove(index);
        self.emit(FeedEvent::PostRemoved(id));
        Ok(())
    }

    /// Remove the comment matching `(author, created_at)` if still present.
    /// Returns whether anything was removed.
    ///
    /// Keyed by creation timestamp rather than sequence number: a merge can
    /// renumber a comment while its round-trip is still in flight, but its
    /// timestamp never changes.
    pub(crate) fn remove_comment(
        &mut self,
        post_id: PostId,
        author: &str,
        created_at: i64,
    ) -> Result<bool> {
        let post = self.post_mut(post_id)?;
        let Some(index) = post
            .comments
            .iter()
            .position(|comment| comment.created_at == created_at && comment.author == author)
        else {
            return Ok(false);
        };

        post.comments.remove(index);
        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(true)
    }

    /// Reconcile a placeholder comment against the authoritative sequence
    /// assignment.
    ///
    /// The placeholder is located by `(author, placeholder_created_at)`,
    /// which a merge-time renumbering never changes. The authoritative
    /// assignment wins its slot: a different comment already holding it is
    /// renumbered to the next free slot. If the authoritative copy itself
    /// was already merged via the remote channel, the placeholder is
    /// dropped.
    pub(crate) fn rewrite_comment_seq(
        &mut self,
        post_id: PostId,
        author: &str,
        placeholder_created_at: i64,
        authoritative: u64,
        created_at: i64,
    ) -> Result<()> {
        self.observe_timestamp(created_at);
        let post = self.post_mut(post_id)?;
        let Some(index) = post.comments.iter().position(|comment| {
            comment.created_at == placeholder_created_at && comment.author == author
        }) else {
            tracing::debug!(post = %post_id, "placeholder comment already reconciled");
            return Ok(());
        };

        if post.comments[index].seq == authoritative && post.comments[index].created_at == created_at
        {
            return Ok(());
        }

        let mut comment = post.comments.remove(index);
        let duplicate = post
            .comments
            .iter()
            .any(|existing| existing.seq == authoritative && existing.author == author);
        if !duplicate {
            comment.seq = authoritative;
            comment.created_at = created_at;
            if let Some(occupied) = post
                .comments
                .iter()
                .position(|existing| existing.seq == authoritative)
            {
                let next_free = post
                    .comments
                    .iter()
                    .map(|existing| existing.seq)
                    .max()
                    .unwrap_or(0)
                    .max(authoritative)
                    + 1;
                post.comments[occupied].seq = next_free;
            }
            post.comments.push(comment);
            post.comments.sort_by_key(|existing| existing.seq);
        }

        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(())
    }

    fn merge_remote_comment(&mut self, post_id: PostId, comment: Comment) -> Result<()> {
        self.observe_timestamp(comment.created_at);
        let post = self.post_mut(post_id)?;
        if post
            .comments
            .iter()
            .any(|existing| existing.seq == comment.seq && existing.author == comment.author)
        {
            tracing::debug!(post = %post_id, seq = comment.seq, "remote comment already present, ignoring redelivery");
            return Ok(());
        }

        let mut incoming = comment;
        if let Some(index) = post
            .comments
            .iter()
            .position(|existing| existing.seq == incoming.seq)
        {
            // Slot collision between different authors: the earlier
            // authoritative timestamp keeps the lower sequence number.
            let next_free = post.next_comment_seq();
            if incoming.created_at < post.comments[index].created_at {
                post.comments[index].seq = next_free;
            } else {
                incoming.seq = next_free;
            }
        }
        post.comments.push(incoming);
        post.comments.sort_by_key(|existing| existing.seq);

        let updated = post.clone();
        self.emit(FeedEvent::PostUpdated(updated));
        Ok(())
    }

    fn insert_post(&mut self, post: Post) {
        self.posts.push(post.clone());
        self.emit(FeedEvent::PostAdded(post));
        self.enforce_post_cap();
    }

    fn enforce_post_cap(&mut self) {
        let Some(max_posts) = self.config.max_posts else {
            return;
        };
        while self.posts.len() > max_posts {
            let Some(oldest_index) = self
                .posts
                .iter()
                .enumerate()
                .min_by_key(|(_, post)| (post.created_at, post.id))
                .map(|(index, _)| index)
            else {
                break;
            };
            let removed = self.posts.remove(oldest_index);
            tracing::debug!(post = %removed.id, "evicting oldest post beyond cap");
            self.emit(FeedEvent::PostRemoved(removed.id));
        }
    }

    fn post_mut(&mut self, id: PostId) -> Result<&mut Post> {
        self.posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn emit(&mut self, event: FeedEvent) {
        for failure in self.hub.deliver(&event) {
            tracing::warn!(
                subscription = ?failure.subscription,
                "observer failed during fan-out: {}",
                failure.message
            );
            self.warnings.push(failure);
        }
    }

    /// Keep the logical clock ahead of every timestamp we have seen, so a
    /// locally-assigned timestamp never sorts before an already-merged
    /// remote one.
    fn observe_timestamp(&mut self, timestamp: i64) {
        self.last_timestamp = self.last_timestamp.max(timestamp);
    }

    /// Wall-clock milliseconds, nudged forward so consecutive local
    /// timestamps are strictly increasing even within the same millisecond.
    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hub::observer;

    fn seeded_post(author: &str, body: &str, created_at: i64) -> Post {
        Post::new(PostId::new(), author, body, created_at)
    }

    #[test]
    fn create_post_starts_with_empty_likes_and_comments() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "Saw a heron").unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.posts[0].id, id);
        assert_eq!(snapshot.posts[0].body, "Saw a heron");
        assert!(snapshot.posts[0].likes.is_empty());
        assert!(snapshot.posts[0].comments.is_empty());
    }

    #[test]
    fn create_post_rejects_blank_body() {
        let mut store = FeedStore::new();
        let error = store.create_post("alice", "   \n\t").unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn toggle_like_flips_membership() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        assert!(store.toggle_like(id, "bob").unwrap());
        assert_eq!(store.get_post(id).unwrap().likes, vec!["bob"]);

        assert!(!store.toggle_like(id, "bob").unwrap());
        assert!(store.get_post(id).unwrap().likes.is_empty());
    }

    #[test]
    fn toggle_like_parity_over_many_calls() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        for round in 1..=7 {
            let liked = store.toggle_like(id, "bob").unwrap();
            assert_eq!(liked, round % 2 == 1);
            assert_eq!(store.get_post(id).unwrap().liked_by("bob"), liked);
        }
    }

    #[test]
    fn toggle_like_unknown_post_is_not_found() {
        let mut store = FeedStore::new();
        let error = store.toggle_like(PostId::new(), "bob").unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn set_like_state_is_idempotent() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        assert!(store.set_like_state(id, "bob", true).unwrap());
        assert!(!store.set_like_state(id, "bob", true).unwrap());
        assert_eq!(store.get_post(id).unwrap().likes, vec!["bob"]);
    }

    #[test]
    fn add_comment_assigns_increasing_sequence_numbers() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        let first = store.add_comment(id, "bob", "first").unwrap();
        let second = store.add_comment(id, "carol", "second").unwrap();
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);

        let post = store.get_post(id).unwrap();
        assert!(post.comments.windows(2).all(|pair| pair[0].seq < pair[1].seq));
        assert!(post.comments[0].created_at < post.comments[1].created_at);
    }

    #[test]
    fn add_comment_rejects_blank_body_without_side_effects() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        let error = store.add_comment(id, "bob", "  ").unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(store.get_post(id).unwrap().comments.is_empty());
    }

    #[test]
    fn snapshot_orders_newest_first_regardless_of_updates() {
        let mut store = FeedStore::new();
        let first = store.create_post("alice", "one").unwrap();
        let second = store.create_post("bob", "two").unwrap();
        let third = store.create_post("carol", "three").unwrap();

        // Updating older posts must not affect creation ordering.
        store.toggle_like(first, "dave").unwrap();
        store.add_comment(second, "dave", "hi").unwrap();

        let ids: Vec<PostId> = store.snapshot().posts.iter().map(|post| post.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[test]
    fn snapshot_breaks_timestamp_ties_deterministically() {
        let mut store = FeedStore::new();
        let post_a = seeded_post("alice", "a", 5000);
        let post_b = seeded_post("bob", "b", 5000);
        let expected_first = post_a.id.max(post_b.id);

        store.apply_remote(RemoteEvent::PostAdded { post: post_b }).unwrap();
        store.apply_remote(RemoteEvent::PostAdded { post: post_a }).unwrap();

        assert_eq!(store.snapshot().posts[0].id, expected_first);
    }

    #[test]
    fn remote_post_redelivery_is_dropped() {
        let mut store = FeedStore::new();
        let post = seeded_post("alice", "hello", 1000);

        store.apply_remote(RemoteEvent::PostAdded { post: post.clone() }).unwrap();
        store.apply_remote(RemoteEvent::PostAdded { post }).unwrap();

        assert_eq!(store.post_count(), 1);
    }

    #[test]
    fn remote_like_redelivery_does_not_double_add() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();

        let event = RemoteEvent::LikeSet {
            post: id,
            identity: "bob".to_string(),
            liked: true,
        };
        store.apply_remote(event.clone()).unwrap();
        store.apply_remote(event).unwrap();

        assert_eq!(store.get_post(id).unwrap().likes, vec!["bob"]);
    }

    #[test]
    fn remote_comment_redelivery_is_deduplicated() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();
        store.add_comment(id, "carol", "hi @bob").unwrap();

        let echo = RemoteEvent::CommentAdded {
            post: id,
            comment: store.get_post(id).unwrap().comments[0].clone(),
        };
        store.apply_remote(echo).unwrap();

        assert_eq!(store.get_post(id).unwrap().comments.len(), 1);
    }

    #[test]
    fn remote_comment_slot_collision_keeps_earlier_timestamp_lower() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();
        let local = store.add_comment(id, "bob", "late local").unwrap();
        let local_created = store.get_post(id).unwrap().comments[0].created_at;

        // A remote comment raced for the same slot with an earlier
        // authoritative timestamp; it wins seq 1.
        store
            .apply_remote(RemoteEvent::CommentAdded {
                post: id,
                comment: Comment {
                    author: "carol".to_string(),
                    body: "early remote".to_string(),
                    created_at: local_created - 10,
                    seq: local.seq,
                },
            })
            .unwrap();

        let post = store.get_post(id).unwrap();
        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[0].author, "carol");
        assert_eq!(post.comments[0].seq, 1);
        assert_eq!(post.comments[1].author, "bob");
        assert_eq!(post.comments[1].seq, 2);
    }

    #[test]
    fn remote_event_for_unknown_post_is_not_found() {
        let mut store = FeedStore::new();
        let error = store
            .apply_remote(RemoteEvent::LikeSet {
                post: PostId::new(),
                identity: "bob".to_string(),
                liked: true,
            })
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[test]
    fn late_subscriber_sees_snapshot_then_only_deltas() {
        let mut store = FeedStore::new();
        store.create_post("alice", "one").unwrap();
        store.create_post("bob", "two").unwrap();

        let log: Arc<Mutex<Vec<FeedEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        store.subscribe(observer(move |event: &FeedEvent| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        }));

        store.create_post("carol", "three").unwrap();

        let events = log.lock().unwrap();
        assert_eq!(events.len(), 2);
        match &events[0] {
            FeedEvent::Snapshot(snapshot) => assert_eq!(snapshot.len(), 2),
            other => panic!("expected initial snapshot, got {other:?}"),
        }
        assert!(matches!(&events[1], FeedEvent::PostAdded(post) if post.body == "three"));
    }

    #[test]
    fn observer_failure_is_collected_not_fatal() {
        let mut store = FeedStore::new();
        store.subscribe(observer(|_: &FeedEvent| Err("observer broke".to_string())));
        // Clear the failure from the initial snapshot delivery.
        store.take_observer_warnings();

        let id = store.create_post("alice", "hello").unwrap();
        assert!(store.contains(id));

        let warnings = store.take_observer_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "observer broke");
        assert!(store.take_observer_warnings().is_empty());
    }

    #[test]
    fn post_cap_evicts_oldest_created() {
        let mut store = FeedStore::with_config(FeedConfig {
            max_posts: Some(2),
            max_comments_per_post: None,
        });
        let first = store.create_post("alice", "one").unwrap();
        let second = store.create_post("bob", "two").unwrap();
        let third = store.create_post("carol", "three").unwrap();

        assert!(!store.contains(first));
        assert!(store.contains(second));
        assert!(store.contains(third));
    }

    #[test]
    fn comment_cap_refuses_overflow() {
        let mut store = FeedStore::with_config(FeedConfig {
            max_posts: None,
            max_comments_per_post: Some(1),
        });
        let id = store.create_post("alice", "hello").unwrap();
        store.add_comment(id, "bob", "one").unwrap();

        let error = store.add_comment(id, "carol", "two").unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert_eq!(store.get_post(id).unwrap().comments.len(), 1);
    }

    #[test]
    fn rewrite_post_id_replaces_placeholder_in_place() {
        let mut store = FeedStore::new();
        let placeholder = store.create_post("alice", "hello").unwrap();
        let authoritative = PostId::new();

        store.rewrite_post_id(placeholder, authoritative).unwrap();
        assert!(!store.contains(placeholder));
        assert_eq!(store.get_post(authoritative).unwrap().body, "hello");
    }

    #[test]
    fn rewrite_post_id_drops_placeholder_when_remote_copy_arrived_first() {
        let mut store = FeedStore::new();
        let placeholder = store.create_post("alice", "hello").unwrap();

        let remote = seeded_post("alice", "hello", 1000);
        let authoritative = remote.id;
        store.apply_remote(RemoteEvent::PostAdded { post: remote }).unwrap();

        store.rewrite_post_id(placeholder, authoritative).unwrap();
        assert_eq!(store.post_count(), 1);
        assert_eq!(store.get_post(authoritative).unwrap().body, "hello");
    }

    #[test]
    fn rewrite_comment_seq_renumbers_and_keeps_order() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();
        let placeholder = store.add_comment(id, "bob", "mine").unwrap();
        let placeholder_created = store
            .get_post(id)
            .unwrap()
            .comment(placeholder.seq)
            .unwrap()
            .created_at;

        // A peer comment claimed slot 2 remotely before our ack came back.
        store
            .apply_remote(RemoteEvent::CommentAdded {
                post: id,
                comment: Comment {
                    author: "carol".to_string(),
                    body: "peer".to_string(),
                    created_at: 9_999_999_999_999,
                    seq: 2,
                },
            })
            .unwrap();

        // The authoritative store assigned our comment seq 3.
        store
            .rewrite_comment_seq(id, "bob", placeholder_created, 3, 10_000_000_000_000)
            .unwrap();

        let post = store.get_post(id).unwrap();
        let seqs: Vec<u64> = post.comments.iter().map(|comment| comment.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert_eq!(post.comment(3).unwrap().author, "bob");
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut store = FeedStore::new();
        let id = store.create_post("alice", "hello").unwrap();
        store.add_comment(id, "bob", "hi").unwrap();

        let snapshot = store.snapshot();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: FeedSnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
    }
}

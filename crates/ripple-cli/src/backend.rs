//! Simulated persistence collaborator.
//!
//! Stands in for the hosted backend during demos and tests: acknowledges
//! each submission after a configurable latency, optionally rejects every
//! Nth one to exercise rollback, and fabricates peer activity (likes and a
//! comment per accepted post). It also redelivers one comment event per
//! post on purpose, since the real delivery channel may do the same.

use std::collections::HashMap;
use std::time::Duration;

use ripple_core::optimistic::Intent;
use ripple_core::remote::{RemoteEvent, RemoteOutcome, RemoteReply, Submission};
use ripple_core::{Comment, Post, PostId};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub struct SimBackendConfig {
    pub latency: Duration,
    /// Reject every Nth submission; 0 disables rejections.
    pub reject_every: usize,
    pub peers: Vec<String>,
}

pub struct SimBackend {
    config: SimBackendConfig,
    submissions: UnboundedReceiver<Submission>,
    events: UnboundedSender<RemoteEvent>,
    replies: UnboundedSender<RemoteReply>,
    next_seq: HashMap<PostId, u64>,
    likes: HashMap<(PostId, String), bool>,
    seen: usize,
    peer_posted: bool,
}

impl SimBackend {
    #[must_use]
    pub fn new(
        config: SimBackendConfig,
        submissions: UnboundedReceiver<Submission>,
        events: UnboundedSender<RemoteEvent>,
        replies: UnboundedSender<RemoteReply>,
    ) -> Self {
        Self {
            config,
            submissions,
            events,
            replies,
            next_seq: HashMap::new(),
            likes: HashMap::new(),
            seen: 0,
            peer_posted: false,
        }
    }

    /// Run until the submission channel closes.
    pub async fn run(mut self) {
        while let Some(submission) = self.submissions.recv().await {
            tokio::time::sleep(self.config.latency).await;
            self.handle(submission);
        }
        tracing::debug!("simulated backend finished: submission channel closed");
    }

    fn handle(&mut self, submission: Submission) {
        self.seen += 1;
        if self.config.reject_every > 0 && self.seen % self.config.reject_every == 0 {
            tracing::info!(correlation = %submission.correlation, "simulated rejection");
            let _ = self.replies.send(RemoteReply::Reject {
                correlation: submission.correlation,
                reason: "simulated backend rejection".to_string(),
            });
            return;
        }

        let outcome = match submission.intent {
            Intent::CreatePost { author, body } => {
                let id = PostId::new();
                self.next_seq.insert(id, 1);
                let outcome = RemoteOutcome::Post { id };
                // Ack first so the client reconciles the id before peer
                // activity referencing it arrives.
                let _ = self.replies.send(RemoteReply::Ack {
                    correlation: submission.correlation,
                    outcome,
                });
                self.fabricate_peer_activity(id, &author);
                return;
            }
            Intent::ToggleLike { post, identity } => {
                let state = self.likes.entry((post, identity)).or_insert(false);
                *state = !*state;
                RemoteOutcome::Like { liked: *state }
            }
            Intent::AddComment { post, .. } => RemoteOutcome::Comment {
                seq: self.take_seq(post),
                created_at: chrono::Utc::now().timestamp_millis(),
            },
        };

        let _ = self.replies.send(RemoteReply::Ack {
            correlation: submission.correlation,
            outcome,
        });
    }

    fn fabricate_peer_activity(&mut self, post: PostId, author: &str) {
        if !self.peer_posted {
            if let Some(peer) = self.config.peers.last().cloned() {
                self.peer_posted = true;
                let peer_post = Post::new(
                    PostId::new(),
                    peer,
                    format!("welcome to the feed, @{author}"),
                    chrono::Utc::now().timestamp_millis(),
                );
                self.next_seq.insert(peer_post.id, 1);
                let _ = self.events.send(RemoteEvent::PostAdded { post: peer_post });
            }
        }

        for peer in self.config.peers.clone() {
            self.likes.insert((post, peer.clone()), true);
            let _ = self.events.send(RemoteEvent::LikeSet {
                post,
                identity: peer,
                liked: true,
            });
        }

        if let Some(peer) = self.config.peers.first().cloned() {
            let comment = Comment {
                author: peer,
                body: format!("nice one, @{author}"),
                created_at: chrono::Utc::now().timestamp_millis(),
                seq: self.take_seq(post),
            };
            let event = RemoteEvent::CommentAdded { post, comment };
            let _ = self.events.send(event.clone());
            // Deliberate redelivery; the client must merge it idempotently.
            let _ = self.events.send(event);
        }
    }

    fn take_seq(&mut self, post: PostId) -> u64 {
        let next = self.next_seq.entry(post).or_insert(1);
        let seq = *next;
        *next += 1;
        seq
    }
}

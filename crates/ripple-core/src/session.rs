//! Client session: identity gate, optimistic proposals, remote submission.

use tokio::sync::mpsc::UnboundedSender;

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::hub::{FeedObserver, ObserverFailure, SubscriptionId};
use crate::models::PostId;
use crate::optimistic::{CorrelationId, Intent, OptimisticMutator, Proposed};
use crate::remote::{RemoteEvent, RemoteOutcome, Submission};
use crate::store::{FeedSnapshot, FeedStore};

/// One client's view of the shared feed.
///
/// Owns the store and the optimistic mutator, gates authored intents on the
/// identity provider's readiness signal, and forwards accepted intents to
/// the persistence collaborator over the attached submission channel.
pub struct FeedSession {
    store: FeedStore,
    mutator: OptimisticMutator,
    identity: Option<String>,
    outbox: Option<UnboundedSender<Submission>>,
    rejections: Vec<(CorrelationId, Error)>,
}

impl FeedSession {
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        Self {
            store: FeedStore::with_config(config),
            mutator: OptimisticMutator::new(),
            identity: None,
            outbox: None,
            rejections: Vec::new(),
        }
    }

    /// Attach the persistence collaborator's submission channel.
    pub fn attach_backend(&mut self, outbox: UnboundedSender<Submission>) {
        self.outbox = Some(outbox);
    }

    /// Readiness signal from the identity provider. Authored proposals fail
    /// with [`Error::IdentityNotReady`] until this has been called.
    pub fn identity_ready(&mut self, identity: impl Into<String>) {
        let identity = identity.into();
        tracing::debug!(identity = %identity, "identity ready");
        self.identity = Some(identity);
    }

    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Propose a new post authored by the session identity.
    pub fn post(&mut self, body: impl Into<String>) -> Result<Proposed> {
        let author = self.require_identity()?;
        self.submit(Intent::CreatePost {
            author,
            body: body.into(),
        })
    }

    /// Propose toggling the session identity's like on `post`.
    pub fn like(&mut self, post: PostId) -> Result<Proposed> {
        let identity = self.require_identity()?;
        self.submit(Intent::ToggleLike { post, identity })
    }

    /// Propose a comment on `post` authored by the session identity.
    pub fn comment(&mut self, post: PostId, body: impl Into<String>) -> Result<Proposed> {
        let author = self.require_identity()?;
        self.submit(Intent::AddComment {
            post,
            author,
            body: body.into(),
        })
    }

    /// Reconcile a remote acknowledgment into the matching pending intent.
    pub fn confirm(&mut self, correlation: CorrelationId, outcome: &RemoteOutcome) -> Result<()> {
        self.mutator.confirm(&mut self.store, correlation, outcome)
    }

    /// Resolve a remote rejection: roll back the intent's delta and record
    /// the outcome for [`Self::take_rejections`].
    pub fn reject(&mut self, correlation: CorrelationId, reason: &str) -> Result<()> {
        self.mutator.reject(&mut self.store, correlation, reason)?;
        self.rejections
            .push((correlation, Error::RemoteRejected(reason.to_string())));
        Ok(())
    }

    /// Cancel a pending intent before its round-trip resolves. Behaves
    /// identically to a rejection.
    pub fn cancel(&mut self, correlation: CorrelationId) -> Result<()> {
        self.mutator.cancel(&mut self.store, correlation)
    }

    /// Merge an authoritative remote change event.
    pub fn apply_remote(&mut self, event: RemoteEvent) -> Result<()> {
        self.store.apply_remote(event)
    }

    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&mut self, observer: Box<dyn FeedObserver>) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    #[must_use]
    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.mutator.pending_count()
    }

    /// Drain observer failures recorded since the last call.
    pub fn take_observer_warnings(&mut self) -> Vec<ObserverFailure> {
        self.store.take_observer_warnings()
    }

    /// Drain remote rejections resolved since the last call. Each entry
    /// carries the rolled-back intent's correlation id and a
    /// [`Error::RemoteRejected`] with the collaborator's reason.
    pub fn take_rejections(&mut self) -> Vec<(CorrelationId, Error)> {
        std::mem::take(&mut self.rejections)
    }

    fn require_identity(&self) -> Result<String> {
        self.identity.clone().ok_or(Error::IdentityNotReady)
    }

    fn submit(&mut self, intent: Intent) -> Result<Proposed> {
        let proposed = self.mutator.propose(&mut self.store, &intent)?;
        let correlation = proposed.correlation();

        if let Some(outbox) = &self.outbox {
            if outbox.send(Submission { correlation, intent }).is_err() {
                // Backend is gone; undo the optimistic application before
                // reporting the failure.
                self.mutator
                    .reject(&mut self.store, correlation, "persistence channel closed")?;
                return Err(Error::Disconnected);
            }
        }
        Ok(proposed)
    }
}

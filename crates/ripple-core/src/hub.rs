//! Subscription fan-out for feed change events.
//!
//! Every store mutation is delivered to all currently-registered observers,
//! in emission order, before the mutating call returns. A failing observer
//! never blocks delivery to the rest and never corrupts store state; its
//! failure is collected and reported on a side channel.

use serde::{Deserialize, Serialize};

use crate::models::{Post, PostId};
use crate::store::FeedSnapshot;

/// A change notification delivered to feed observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedEvent {
    /// Synthetic initial event delivered to a new subscriber
    Snapshot(FeedSnapshot),
    /// A post was inserted
    PostAdded(Post),
    /// A post's likes or comments changed, or its id was reconciled
    PostUpdated(Post),
    /// A post was evicted or rolled back
    PostRemoved(PostId),
}

/// Handle identifying a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Non-fatal report of an observer callback failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserverFailure {
    pub subscription: SubscriptionId,
    pub message: String,
}

/// Callback contract for feed observers.
///
/// Returning `Err` reports the failure to the caller of the mutation that
/// produced the event; it does not abort the mutation or the fan-out.
pub trait FeedObserver: Send {
    fn on_event(&mut self, event: &FeedEvent) -> std::result::Result<(), String>;
}

impl<F> FeedObserver for F
where
    F: FnMut(&FeedEvent) -> std::result::Result<(), String> + Send,
{
    fn on_event(&mut self, event: &FeedEvent) -> std::result::Result<(), String> {
        self(event)
    }
}

/// Wrap a closure as a boxed observer.
pub fn observer<F>(callback: F) -> Box<dyn FeedObserver>
where
    F: FnMut(&FeedEvent) -> std::result::Result<(), String> + Send + 'static,
{
    Box::new(callback)
}

/// Ordered registry of feed observers.
#[derive(Default)]
pub struct SubscriptionHub {
    observers: Vec<(SubscriptionId, Box<dyn FeedObserver>)>,
    next_id: u64,
}

impl SubscriptionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer, delivering `initial` to it before returning so
    /// a late subscriber never waits for the next mutation to see state.
    pub fn subscribe(
        &mut self,
        mut observer: Box<dyn FeedObserver>,
        initial: &FeedEvent,
    ) -> (SubscriptionId, Option<ObserverFailure>) {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let failure = observer.on_event(initial).err().map(|message| ObserverFailure {
            subscription: id,
            message,
        });
        self.observers.push((id, observer));
        (id, failure)
    }

    /// Remove an observer. A no-op when already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(existing, _)| *existing != id);
    }

    /// Deliver one event to every observer, in registration order.
    ///
    /// Failures are collected instead of propagated so that one observer
    /// cannot starve the others.
    pub fn deliver(&mut self, event: &FeedEvent) -> Vec<ObserverFailure> {
        let mut failures = Vec::new();
        for (id, observer) in &mut self.observers {
            if let Err(message) = observer.on_event(event) {
                failures.push(ObserverFailure {
                    subscription: *id,
                    message,
                });
            }
        }
        failures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

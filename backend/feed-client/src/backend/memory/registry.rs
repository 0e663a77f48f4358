use crate::backend::{OrderedQuery, SubscriptionEvent};
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Unique identifier for a live-query subscriber
///
/// Each subscription gets its own id so that cancelling one never
/// disturbs another subscriber on the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber {
    id: SubscriberId,
    query: OrderedQuery,
    sender: UnboundedSender<SubscriptionEvent>,
}

/// Tracks which live queries are open on which collections
#[derive(Default)]
pub struct SubscriberRegistry {
    // collection -> subscribers
    inner: HashMap<String, Vec<Subscriber>>,
}

impl SubscriberRegistry {
    /// Register a query, returning its id and the receiving end of its event stream
    pub fn add(&mut self, query: OrderedQuery) -> (SubscriberId, UnboundedReceiver<SubscriptionEvent>) {
        let (tx, rx) = unbounded_channel();
        let id = SubscriberId::new();
        let collection = query.collection.clone();

        self.inner.entry(collection.clone()).or_default().push(Subscriber {
            id,
            query,
            sender: tx,
        });

        tracing::debug!(
            subscriber = ?id,
            %collection,
            total = self.count(&collection),
            "Added subscriber"
        );

        (id, rx)
    }

    /// Send one event to a single subscriber
    pub fn send_to(&self, collection: &str, id: SubscriberId, event: SubscriptionEvent) -> bool {
        self.inner
            .get(collection)
            .and_then(|subscribers| subscribers.iter().find(|s| s.id == id))
            .map(|s| s.sender.send(event).is_ok())
            .unwrap_or(false)
    }

    /// Remove a subscriber. Removing an unknown id is a no-op.
    pub fn remove(&mut self, collection: &str, id: SubscriberId) {
        if let Some(subscribers) = self.inner.get_mut(collection) {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != id);

            if before != subscribers.len() {
                tracing::debug!(subscriber = ?id, %collection, remaining = subscribers.len(), "Removed subscriber");
            }

            if subscribers.is_empty() {
                self.inner.remove(collection);
            }
        }
    }

    /// Deliver an event built per query to every subscriber of a collection.
    ///
    /// Subscribers whose receiver is gone are dropped.
    pub fn broadcast<F>(&mut self, collection: &str, mut event_for: F)
    where
        F: FnMut(&OrderedQuery) -> SubscriptionEvent,
    {
        if let Some(subscribers) = self.inner.get_mut(collection) {
            let before = subscribers.len();

            subscribers.retain(|subscriber| subscriber.sender.send(event_for(&subscriber.query)).is_ok());

            let after = subscribers.len();
            if before != after {
                tracing::debug!(
                    %collection,
                    cleaned = before - after,
                    active = after,
                    "Dropped dead subscribers"
                );
            }

            if subscribers.is_empty() {
                self.inner.remove(collection);
            }
        }
    }

    pub fn count(&self, collection: &str) -> usize {
        self.inner.get(collection).map(|v| v.len()).unwrap_or(0)
    }
}

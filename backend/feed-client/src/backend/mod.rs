//! Collaborator boundary
//!
//! The managed auth/store service is consumed only through [`AuthProvider`]
//! and [`PostStore`]. Both are injected as `Arc<dyn ...>` so the session gate
//! and the feed synchronizer can be exercised against the in-process
//! implementation in [`memory`].

use crate::models::{NewPost, PostId, Session};
use async_trait::async_trait;
use error_types::{AuthError, StoreError, SubscriptionError};
use std::fmt;
use tokio::sync::mpsc::UnboundedReceiver;

pub mod memory;

pub use memory::{MemoryAuth, MemoryPostStore};

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_session(&self) -> Option<Session>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Append a document; the store assigns the id and resolves server timestamps
    async fn append(&self, collection: &str, post: NewPost) -> Result<PostId, StoreError>;

    /// Open a live query. The first event is the current result set.
    async fn subscribe_ordered(&self, query: OrderedQuery) -> Result<Subscription, SubscriptionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Whole-collection query ordered by a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedQuery {
    pub collection: String,
    pub order_key: String,
    pub direction: Direction,
}

impl OrderedQuery {
    pub fn descending(collection: impl Into<String>, order_key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order_key: order_key.into(),
            direction: Direction::Descending,
        }
    }
}

/// Raw document as delivered by a live query
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: PostId,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// Full current result set, in query order. Never a delta.
    Snapshot(Vec<DocumentSnapshot>),
    Error(SubscriptionError),
}

/// A live query: an ordered event stream plus the handle that ends it
pub struct Subscription {
    events: UnboundedReceiver<SubscriptionEvent>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub fn new(events: UnboundedReceiver<SubscriptionEvent>, handle: SubscriptionHandle) -> Self {
        Self { events, handle }
    }

    pub fn into_parts(self) -> (UnboundedReceiver<SubscriptionEvent>, SubscriptionHandle) {
        (self.events, self.handle)
    }
}

/// Releases a live query. Cancelling twice is a no-op; dropping cancels.
pub struct SubscriptionHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_handle_cancels_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut handle = SubscriptionHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        drop(handle);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let handle = SubscriptionHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        drop(handle);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

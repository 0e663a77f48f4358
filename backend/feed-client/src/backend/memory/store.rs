use super::registry::SubscriberRegistry;
use crate::backend::{
    Direction, DocumentSnapshot, OrderedQuery, PostStore, Subscription, SubscriptionEvent,
    SubscriptionHandle,
};
use crate::clock::Clock;
use crate::models::{NewPost, PostId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_types::{StoreError, SubscriptionError};
use parking_lot::Mutex;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

struct Record {
    id: PostId,
    // insertion order, breaks ties between equal order keys
    sequence: u64,
    data: Value,
}

#[derive(Default)]
struct StoreInner {
    collections: HashMap<String, Vec<Record>>,
    next_sequence: u64,
    fail_next_append: Option<StoreError>,
    fail_next_subscribe: Option<SubscriptionError>,
    registry: SubscriberRegistry,
}

impl StoreInner {
    fn insert(&mut self, collection: &str, data: Value) -> PostId {
        let id = PostId::new(Uuid::new_v4().simple().to_string());
        self.next_sequence += 1;

        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(Record {
                id: id.clone(),
                sequence: self.next_sequence,
                data,
            });

        id
    }

    /// Push the current result set to every live query on `collection`
    fn publish(&mut self, collection: &str) {
        let StoreInner {
            collections,
            registry,
            ..
        } = self;

        registry.broadcast(collection, |query| {
            SubscriptionEvent::Snapshot(snapshot(collections, query))
        });
    }
}

/// Sort key for the order field. Nulls sort first, like pending server timestamps.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderValue {
    Null,
    Timestamp(DateTime<Utc>),
    Text(String),
}

fn order_value(value: &Value) -> OrderValue {
    match value {
        Value::Null => OrderValue::Null,
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(at) => OrderValue::Timestamp(at.with_timezone(&Utc)),
            Err(_) => OrderValue::Text(s.clone()),
        },
        other => OrderValue::Text(other.to_string()),
    }
}

/// Documents matching `query`, in query order.
///
/// Documents without the order field are not part of the result set.
fn snapshot(collections: &HashMap<String, Vec<Record>>, query: &OrderedQuery) -> Vec<DocumentSnapshot> {
    let Some(records) = collections.get(&query.collection) else {
        return Vec::new();
    };

    let mut keyed: Vec<(OrderValue, &Record)> = records
        .iter()
        .filter_map(|record| {
            record
                .data
                .get(&query.order_key)
                .map(|value| (order_value(value), record))
        })
        .collect();

    keyed.sort_by(|(a_key, a), (b_key, b)| {
        let ordering: Ordering = a_key.cmp(b_key).then(a.sequence.cmp(&b.sequence));
        match query.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });

    keyed
        .into_iter()
        .map(|(_, record)| DocumentSnapshot {
            id: record.id.clone(),
            data: record.data.clone(),
        })
        .collect()
}

/// In-process document store with live ordered queries
///
/// Every change to a collection pushes a full snapshot to each of its
/// subscribers while the store lock is held, so subscribers observe
/// snapshots in the order the changes happened.
#[derive(Clone)]
pub struct MemoryPostStore {
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryPostStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Arc::new(Mutex::new(StoreInner::default())),
        }
    }

    /// Make the next `append` fail with `error`
    pub fn fail_next_append(&self, error: StoreError) {
        self.inner.lock().fail_next_append = Some(error);
    }

    /// Make the next `subscribe_ordered` fail with `error`
    pub fn fail_next_subscribe(&self, error: SubscriptionError) {
        self.inner.lock().fail_next_subscribe = Some(error);
    }

    /// Deliver `error` on the error channel of every live query on `collection`
    pub fn push_subscription_error(&self, collection: &str, error: SubscriptionError) {
        self.inner
            .lock()
            .registry
            .broadcast(collection, |_| SubscriptionEvent::Error(error.clone()));
    }

    /// Store an arbitrary document, bypassing the post shape
    pub fn insert_raw(&self, collection: &str, data: Value) -> PostId {
        let mut inner = self.inner.lock();
        let id = inner.insert(collection, data);
        inner.publish(collection);
        id
    }

    /// Re-send the current result set to every live query on `collection`
    pub fn redeliver(&self, collection: &str) {
        self.inner.lock().publish(collection);
    }

    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.inner.lock().registry.count(collection)
    }

    /// Stored documents in insertion order
    pub fn documents(&self, collection: &str) -> Vec<DocumentSnapshot> {
        self.inner
            .lock()
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|r| DocumentSnapshot {
                        id: r.id.clone(),
                        data: r.data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn append(&self, collection: &str, post: NewPost) -> Result<PostId, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.fail_next_append.take() {
            return Err(error);
        }

        let document = post.resolve(self.clock.now());
        let data = serde_json::to_value(&document)
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?;

        let id = inner.insert(collection, data);
        inner.publish(collection);

        tracing::debug!(%collection, post_id = %id, "Document appended");
        Ok(id)
    }

    async fn subscribe_ordered(&self, query: OrderedQuery) -> Result<Subscription, SubscriptionError> {
        let collection = query.collection.clone();

        let (id, events) = {
            let mut inner = self.inner.lock();
            if let Some(error) = inner.fail_next_subscribe.take() {
                return Err(error);
            }

            let initial = snapshot(&inner.collections, &query);
            let (id, events) = inner.registry.add(query);
            inner
                .registry
                .send_to(&collection, id, SubscriptionEvent::Snapshot(initial));
            (id, events)
        };

        let store = Arc::downgrade(&self.inner);
        let handle = SubscriptionHandle::new(move || {
            if let Some(inner) = store.upgrade() {
                inner.lock().registry.remove(&collection, id);
            }
        });

        Ok(Subscription::new(events, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<Value>) -> HashMap<String, Vec<Record>> {
        let mut collections = HashMap::new();
        collections.insert(
            "posts".to_string(),
            values
                .into_iter()
                .enumerate()
                .map(|(i, data)| Record {
                    id: PostId::new(format!("doc-{}", i)),
                    sequence: i as u64,
                    data,
                })
                .collect(),
        );
        collections
    }

    fn ids(docs: &[DocumentSnapshot]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_descending_with_sequence_tiebreak() {
        let collections = records(vec![
            json!({ "timestamp": "2024-03-01T10:00:00Z" }),
            json!({ "timestamp": "2024-03-01T12:00:00Z" }),
            json!({ "timestamp": "2024-03-01T10:00:00Z" }),
        ]);

        let docs = snapshot(&collections, &OrderedQuery::descending("posts", "timestamp"));
        assert_eq!(ids(&docs), vec!["doc-1", "doc-2", "doc-0"]);

        // same input, same order
        let again = snapshot(&collections, &OrderedQuery::descending("posts", "timestamp"));
        assert_eq!(ids(&docs), ids(&again));
    }

    #[test]
    fn test_missing_order_field_is_excluded_and_null_sorts_last_descending() {
        let collections = records(vec![
            json!({ "content": "no timestamp" }),
            json!({ "timestamp": null }),
            json!({ "timestamp": "2024-03-01T12:00:00Z" }),
        ]);

        let docs = snapshot(&collections, &OrderedQuery::descending("posts", "timestamp"));
        assert_eq!(ids(&docs), vec!["doc-2", "doc-1"]);
    }

    #[test]
    fn test_timestamps_compare_as_instants() {
        // lexically "...00.5Z" < "...00Z" but it is the later instant
        let collections = records(vec![
            json!({ "timestamp": "2024-03-01T12:00:00Z" }),
            json!({ "timestamp": "2024-03-01T12:00:00.5Z" }),
        ]);

        let docs = snapshot(&collections, &OrderedQuery::descending("posts", "timestamp"));
        assert_eq!(ids(&docs), vec!["doc-1", "doc-0"]);
    }

    #[test]
    fn test_unknown_collection_is_empty() {
        let collections = records(vec![]);
        let docs = snapshot(&collections, &OrderedQuery::descending("comments", "timestamp"));
        assert!(docs.is_empty());
    }
}

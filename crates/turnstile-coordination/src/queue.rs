//! Single-consumer FIFO message queue over one named list.
//!
//! A plain push/pop pair: payloads are JSON-encoded, appended to the tail of
//! the list, and popped from its head. There is no acknowledgment state and
//! no redelivery; once consumed, a message is gone. Ordering beyond FIFO and
//! delivery to multiple consumers are out of scope.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use tracing::debug;
use turnstile_core::StoreClient;
use turnstile_core::constants::DEFAULT_QUEUE_NAME;

use crate::error::QueueError;
use crate::error::SerializationSnafu;
use crate::error::StorageSnafu;

/// FIFO queue of opaque structured payloads under one named list.
pub struct MessageQueue<S: StoreClient + ?Sized> {
    store: Arc<S>,
    name: String,
}

impl<S: StoreClient + ?Sized> MessageQueue<S> {
    /// Create a queue over the default list name.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_name(store, DEFAULT_QUEUE_NAME)
    }

    /// Create a queue over an explicitly named list.
    pub fn with_name(store: Arc<S>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// The list name this queue publishes to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialize `payload` and append it to the tail of the queue.
    pub async fn publish<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), QueueError> {
        let encoded = serde_json::to_string(payload).context(SerializationSnafu { queue: &self.name })?;
        self.store
            .push_back(&self.name, &encoded)
            .await
            .context(StorageSnafu {
                operation: "publish",
                queue: &self.name,
            })?;
        debug!(queue = %self.name, "message published");
        Ok(())
    }

    /// Pop and deserialize the message at the head of the queue.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    pub async fn consume<T: DeserializeOwned>(&self) -> Result<Option<T>, QueueError> {
        let raw = self
            .store
            .pop_front(&self.name)
            .await
            .context(StorageSnafu {
                operation: "consume",
                queue: &self.name,
            })?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let payload = serde_json::from_str(&raw).context(SerializationSnafu { queue: &self.name })?;
        debug!(queue = %self.name, "message consumed");
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;
    use serde_json::json;
    use turnstile_core::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_fifo_round_trip() {
        let store = MemoryStore::new();
        let queue = MessageQueue::new(store);

        queue.publish(&json!({"a": 1})).await.unwrap();
        queue.publish(&json!({"b": 2})).await.unwrap();

        assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), Some(json!({"b": 2})));
        assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_nested_mapping_round_trips_exactly() {
        let store = MemoryStore::new();
        let queue = MessageQueue::new(store);

        let payload = json!({
            "job": "resize",
            "attempts": 3,
            "params": {"width": 640, "height": 480, "formats": ["png", "webp"]}
        });
        queue.publish(&payload).await.unwrap();
        assert_eq!(queue.consume::<serde_json::Value>().await.unwrap(), Some(payload));
    }

    #[tokio::test]
    async fn test_typed_payload_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Job {
            id: u64,
            tags: BTreeMap<String, i64>,
        }

        let store = MemoryStore::new();
        let queue = MessageQueue::with_name(store, "jobs");

        let job = Job {
            id: 7,
            tags: BTreeMap::from([("priority".to_string(), 2)]),
        };
        queue.publish(&job).await.unwrap();
        assert_eq!(queue.consume::<Job>().await.unwrap(), Some(job));
    }

    #[tokio::test]
    async fn test_named_queues_are_independent() {
        let store = MemoryStore::new();
        let orders = MessageQueue::with_name(Arc::clone(&store), "orders");
        let audits = MessageQueue::with_name(store, "audits");

        orders.publish(&json!({"order": 1})).await.unwrap();

        assert_eq!(audits.consume::<serde_json::Value>().await.unwrap(), None);
        assert_eq!(orders.consume::<serde_json::Value>().await.unwrap(), Some(json!({"order": 1})));
    }

    #[tokio::test]
    async fn test_undecodable_message_is_a_serialization_error() {
        let store = MemoryStore::new();
        let queue = MessageQueue::with_name(Arc::clone(&store), "jobs");

        store.push_back("jobs", "not json").await.unwrap();
        let err = queue.consume::<serde_json::Value>().await.unwrap_err();
        assert!(matches!(err, QueueError::Serialization { .. }));
    }
}

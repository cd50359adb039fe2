//! The store client trait coordination primitives are built on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Atomic key-value store interface.
///
/// Each operation is a single atomic action against one string key. The store
/// is assumed linearizable per key; the coordination primitives derive all of
/// their safety from that assumption and hold no state of their own between
/// calls.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Set `key` to `value` with a TTL, only if the key is absent.
    ///
    /// Returns `true` if the key was absent and is now set.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Delete `key` only if its current value equals `expected`.
    ///
    /// Returns `true` if the key was deleted. A missing key or a different
    /// stored value leaves the store untouched and returns `false`.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    /// Remove sorted-set members of `key` with score in `[min, max]`.
    ///
    /// Returns the number of members removed (0 for a missing key).
    async fn sorted_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64, StoreError>;

    /// Count the members of the sorted set at `key` (0 for a missing key).
    async fn sorted_count(&self, key: &str) -> Result<u64, StoreError>;

    /// Add `member` with `score` to the sorted set at `key`, creating the
    /// set if needed.
    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Set the TTL of `key`.
    ///
    /// Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Append `value` to the tail of the list at `key`.
    ///
    /// Returns the new list length.
    async fn push_back(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Pop a value from the head of the list at `key`.
    ///
    /// Returns `None` when the list is empty or missing.
    async fn pop_front(&self, key: &str) -> Result<Option<String>, StoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: StoreClient + ?Sized> StoreClient for Arc<T> {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        (**self).set_if_absent(key, value, ttl).await
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        (**self).compare_and_delete(key, expected).await
    }

    async fn sorted_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64, StoreError> {
        (**self).sorted_remove_range_by_score(key, min, max).await
    }

    async fn sorted_count(&self, key: &str) -> Result<u64, StoreError> {
        (**self).sorted_count(key).await
    }

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        (**self).sorted_add(key, member, score).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        (**self).expire(key, ttl).await
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        (**self).push_back(key, value).await
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).pop_front(key).await
    }
}

//! Deterministic in-memory store client for testing.
//!
//! Implements every [`StoreClient`] operation over a map guarded by an async
//! `RwLock`, so primitives can be exercised hermetically without a server.
//! TTLs are honored by lazy eviction: an entry past its deadline is removed
//! the next time any operation touches its key.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::StoreClient;

/// What a key holds.
enum EntryKind {
    Value(String),
    Sorted(BTreeMap<String, f64>),
    List(VecDeque<String>),
}

struct Entry {
    kind: EntryKind,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Thread-safe in-memory implementation of [`StoreClient`].
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl MemoryStore {
    /// Create a new in-memory store wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// Remove `key` if its TTL has passed, so lookups only ever see live entries.
fn evict_expired(entries: &mut BTreeMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::is_expired) {
        entries.remove(key);
    }
}

fn wrong_kind(key: &str, expected: &'static str) -> StoreError {
    StoreError::WrongKind {
        key: key.to_string(),
        expected,
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Entry {
            kind: EntryKind::Value(value.to_string()),
            expires_at: Some(Instant::now() + ttl),
        });
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        let matches = match entries.get(key) {
            Some(entry) => match &entry.kind {
                EntryKind::Value(value) => value == expected,
                _ => return Err(wrong_kind(key, "value")),
            },
            None => return Ok(false),
        };
        if matches {
            entries.remove(key);
        }
        Ok(matches)
    }

    async fn sorted_remove_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        match entries.get_mut(key) {
            Some(entry) => match &mut entry.kind {
                EntryKind::Sorted(members) => {
                    let before = members.len();
                    members.retain(|_, score| *score < min || *score > max);
                    Ok((before - members.len()) as u64)
                }
                _ => Err(wrong_kind(key, "sorted set")),
            },
            None => Ok(0),
        }
    }

    async fn sorted_count(&self, key: &str) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => match &entry.kind {
                EntryKind::Sorted(members) => Ok(members.len() as u64),
                _ => Err(wrong_kind(key, "sorted set")),
            },
            None => Ok(0),
        }
    }

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            kind: EntryKind::Sorted(BTreeMap::new()),
            expires_at: None,
        });
        match &mut entry.kind {
            EntryKind::Sorted(members) => {
                members.insert(member.to_string(), score);
                Ok(())
            }
            _ => Err(wrong_kind(key, "sorted set")),
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            kind: EntryKind::List(VecDeque::new()),
            expires_at: None,
        });
        match &mut entry.kind {
            EntryKind::List(items) => {
                items.push_back(value.to_string());
                Ok(items.len() as u64)
            }
            _ => Err(wrong_kind(key, "list")),
        }
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, key);
        let (popped, now_empty) = match entries.get_mut(key) {
            Some(entry) => match &mut entry.kind {
                EntryKind::List(items) => {
                    let popped = items.pop_front();
                    (popped, items.is_empty())
                }
                _ => return Err(wrong_kind(key, "list")),
            },
            None => return Ok(None),
        };
        // Redis removes a list key once it empties.
        if now_empty {
            entries.remove(key);
        }
        Ok(popped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_if_absent_respects_existing_key() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("k", "a", Duration::from_secs(10)).await.unwrap());
        assert!(!store.set_if_absent("k", "b", Duration::from_secs(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_if_absent_after_expiry() {
        let store = MemoryStore::new();
        assert!(store.set_if_absent("k", "a", Duration::from_millis(20)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(store.set_if_absent("k", "b", Duration::from_secs(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_delete_only_matches_value() {
        let store = MemoryStore::new();
        store.set_if_absent("k", "owner-1", Duration::from_secs(10)).await.unwrap();

        assert!(!store.compare_and_delete("k", "owner-2").await.unwrap());
        assert!(store.compare_and_delete("k", "owner-1").await.unwrap());
        assert!(!store.compare_and_delete("k", "owner-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_sorted_remove_range_and_count() {
        let store = MemoryStore::new();
        store.sorted_add("z", "a", 1.0).await.unwrap();
        store.sorted_add("z", "b", 2.0).await.unwrap();
        store.sorted_add("z", "c", 3.0).await.unwrap();

        assert_eq!(store.sorted_count("z").await.unwrap(), 3);
        assert_eq!(store.sorted_remove_range_by_score("z", 0.0, 2.0).await.unwrap(), 2);
        assert_eq!(store.sorted_count("z").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sorted_count_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.sorted_count("missing").await.unwrap(), 0);
        assert_eq!(store.sorted_remove_range_by_score("missing", 0.0, 1.0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_fifo_order() {
        let store = MemoryStore::new();
        assert_eq!(store.push_back("q", "first").await.unwrap(), 1);
        assert_eq!(store.push_back("q", "second").await.unwrap(), 2);

        assert_eq!(store.pop_front("q").await.unwrap().as_deref(), Some("first"));
        assert_eq!(store.pop_front("q").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.pop_front("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_missing_key() {
        let store = MemoryStore::new();
        assert!(!store.expire("missing", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_expire_evicts_sorted_set() {
        let store = MemoryStore::new();
        store.sorted_add("z", "a", 1.0).await.unwrap();
        store.expire("z", Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.sorted_count("z").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_kind_is_an_error() {
        let store = MemoryStore::new();
        store.push_back("q", "x").await.unwrap();
        let err = store.sorted_count("q").await.unwrap_err();
        assert!(matches!(err, StoreError::WrongKind { .. }));
    }
}

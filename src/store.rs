//! Key-value storage boundary.
//!
//! The bot persists every record as a JSON string under a plain string key.
//! [`KvStore`] is the contract a host platform fulfils (Workers KV, Redis, a
//! database table); [`MemoryKvStore`] is the bundled implementation used by
//! tests and the dev REPL.
//!
//! JSON encoding and decoding is confined to [`get_record`] / [`put_record`]
//! so the typed models stay free of serialization calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from the storage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed (connectivity, quota, host fault).
    #[error("storage operation failed: {0}")]
    Backend(String),

    /// A stored value could not be decoded into the expected record shape.
    #[error("corrupt record at key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for storage.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// An asynchronous string key-value store with optional per-key TTL.
///
/// Semantics expected from implementations:
/// - `get` on a missing or expired key returns `Ok(None)`.
/// - `put` overwrites unconditionally; `ttl_seconds: None` means no expiry.
/// - `delete` on a missing key is a no-op, not an error.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, expiring after `ttl_seconds` if given.
    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), StoreError>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Fetch and decode a JSON record.
///
/// A missing key is `Ok(None)`. A present but undecodable value is
/// [`StoreError::Corrupt`]; callers treat that as a storage fault, not as an
/// absent record, so corrupt data is never silently overwritten.
pub async fn get_record<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode and store a JSON record.
pub async fn put_record<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    record: &T,
    ttl_seconds: Option<u64>,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(record).map_err(StoreError::Encode)?;
    store.put(key, &raw, ttl_seconds).await
}

/// In-memory [`KvStore`] with lazy TTL expiry.
///
/// Entries past their deadline are dropped on the next `get`; until then they
/// occupy memory but are never returned. Suitable for tests, the dev REPL,
/// and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemoryEntry>> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the map itself is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get(key) {
            if let Some(expires_at) = entry.expires_at {
                if Instant::now() >= expires_at {
                    entries.remove(key);
                    return Ok(None);
                }
            }
            return Ok(Some(entry.value.clone()));
        }
        Ok(None)
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), StoreError> {
        let expires_at = ttl_seconds.map(|secs| Instant::now() + Duration::from_secs(secs));
        self.lock().insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[tokio::test]
    async fn get_put_round_trip() {
        let store = MemoryKvStore::new();
        store.put("k", "v", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryKvStore::new();
        store.put("k", "v1", None).await.unwrap();
        store.put("k", "v2", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_and_tolerates_missing() {
        let store = MemoryKvStore::new();
        store.put("k", "v", None).await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing() {
        let store = MemoryKvStore::new();
        store.put("k", "v", Some(0)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Demo {
        n: u32,
    }

    #[tokio::test]
    async fn record_seam_round_trips() {
        let store = MemoryKvStore::new();
        put_record(&store, "demo", &Demo { n: 7 }, None).await.unwrap();
        let back: Option<Demo> = get_record(&store, "demo").await.unwrap();
        assert_eq!(back, Some(Demo { n: 7 }));
    }

    #[tokio::test]
    async fn corrupt_record_is_an_error_not_none() {
        let store = MemoryKvStore::new();
        store.put("demo", "not json", None).await.unwrap();
        let result: Result<Option<Demo>, _> = get_record(&store, "demo").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}

//! Keyed ephemeral storage for short-lived values.
//!
//! The trait mirrors the cache backends this service may run against:
//! `put` with a time-to-live, `get`, `delete`. Callers must not rely on the
//! backend actually enforcing the TTL; anything with a hard freshness
//! requirement checks timestamps itself on read.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry. The entry
    /// becomes eligible for eviction after `ttl`.
    async fn put(&self, key: &str, value: String, ttl: std::time::Duration) -> Result<()>;

    /// Returns the value for `key`, or `None` if absent or evicted.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Removes the entry for `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[derive(Debug)]
struct StoredValue {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local store backed by a mutex-guarded map. Entries past their
/// TTL are dropped lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryEphemeralStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl InMemoryEphemeralStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for InMemoryEphemeralStore {
    async fn put(&self, key: &str, value: String, ttl: std::time::Duration) -> Result<()> {
        let expires_at = Utc::now() + Duration::seconds(ttl.as_secs() as i64);

        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), StoredValue { value, expires_at });

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(stored) if stored.expires_at <= Utc::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = InMemoryEphemeralStore::new();

        store
            .put("k", "v".to_string(), StdDuration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_existing_value() {
        let store = InMemoryEphemeralStore::new();

        store
            .put("k", "first".to_string(), StdDuration::from_secs(60))
            .await
            .unwrap();
        store
            .put("k", "second".to_string(), StdDuration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_ttl_eviction_on_read() {
        let store = InMemoryEphemeralStore::new();

        store
            .put("k", "v".to_string(), StdDuration::from_secs(0))
            .await
            .unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = InMemoryEphemeralStore::new();
        store.delete("absent").await.unwrap();
    }
}

//! Read-through caches for loaded index objects.
//!
//! Entries are append-only. Without a TTL they live for the whole process
//! (one Lambda container); with a TTL an entry older than the TTL reads as a
//! miss and is replaced by the next successful load. Failed loads are never
//! stored. Concurrent loads of the same key are coalesced into one fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use gallery_atoms::posts::ItemBatch;
use gallery_atoms::tags::TagIndex;

struct CacheEntry<T> {
    value: Arc<T>,
    inserted_at: Instant,
}

pub struct ShardCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    /// One gate per key; held while that key is being loaded
    loading: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    ttl: Option<Duration>,
}

impl<T> ShardCache<T> {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Process-lifetime cache
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    fn is_fresh(&self, entry: &CacheEntry<T>) -> bool {
        match self.ttl {
            Some(ttl) => entry.inserted_at.elapsed() < ttl,
            None => true,
        }
    }

    /// Fresh entry for `key`, if any
    pub async fn get(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Entry for `key` regardless of age
    pub async fn get_stale(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                inserted_at: Instant::now(),
            },
        );
        value
    }

    /// Fresh entry for `key`, or the result of `load`.
    ///
    /// Callers racing on the same key wait for the first one's load and then
    /// read its entry. A failed load is returned to its caller only; the next
    /// waiter tries again.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &str, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let gate = {
            let mut loading = self.loading.lock().await;
            loading.entry(key.to_string()).or_default().clone()
        };
        let _loading = gate.lock().await;

        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = load().await?;
        Ok(self.insert(key, value).await)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// The caches the search engine reads through
pub struct SearchCaches {
    pub tag_shards: ShardCache<TagIndex>,
    pub batches: ShardCache<ItemBatch>,
}

impl SearchCaches {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            tag_shards: ShardCache::new(ttl),
            batches: ShardCache::new(ttl),
        }
    }
}

impl Default for SearchCaches {
    fn default() -> Self {
        Self::new(None)
    }
}

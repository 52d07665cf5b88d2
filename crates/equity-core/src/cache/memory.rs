//! In-process timed cache

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Values keyed by upper-cased ticker, each expiring `ttl` after insertion.
///
/// Clones share the same storage.
pub struct MemoryCache<V> {
    entries: Arc<Mutex<TimedCache<String, V>>>,
}

fn ticker_key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl<V: Clone> MemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, symbol: &str) -> Option<V> {
        // TimedCache evicts on read, so lookups need exclusive access
        let mut entries = self.entries.lock().await;
        let hit = entries.cache_get(&ticker_key(symbol)).cloned();
        tracing::trace!(symbol, hit = hit.is_some(), "Memory cache lookup");
        hit
    }

    pub async fn insert(&self, symbol: &str, value: V) {
        self.entries.lock().await.cache_set(ticker_key(symbol), value);
    }

    /// Drop one ticker; returns whether it was present.
    pub async fn remove(&self, symbol: &str) -> bool {
        self.entries
            .lock()
            .await
            .cache_remove(&ticker_key(symbol))
            .is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.cache_clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

//! Caching layer for market snapshots to reduce upstream calls
//!
//! Two tiers: a process-local [`MemoryCache`] in front of a JSON
//! [`DiskCache`] that survives restarts.

mod disk;
mod memory;

pub use disk::{CacheStats, DiskCache};
pub use memory::MemoryCache;

use crate::config::ResearchConfig;
use crate::data::MarketSnapshot;
use crate::error::Result;
use std::time::Duration;

/// Memory lifespan is capped so a long-running dashboard still refreshes.
const MEMORY_TTL_CAP: Duration = Duration::from_secs(15 * 60);

/// Multi-tiered cache for market snapshots
pub struct CacheManager {
    /// Hot cache shared by concurrent requests
    pub memory: MemoryCache<MarketSnapshot>,
    /// Persistent cache in `cache_dir`
    pub disk: DiskCache,
}

impl CacheManager {
    /// Create a cache manager from configuration
    pub fn new(config: &ResearchConfig) -> Self {
        Self {
            memory: MemoryCache::new(config.cache_expiry.min(MEMORY_TTL_CAP)),
            disk: DiskCache::new(
                config.cache_dir.clone(),
                config.cache_expiry,
                config.cache_keep_per_ticker,
            ),
        }
    }

    /// Look up a snapshot, memory first and then disk.
    pub async fn get_snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        if let Some(snapshot) = self.memory.get(symbol).await {
            return Some(snapshot);
        }

        match self.disk.load::<MarketSnapshot>(symbol).await {
            Ok(Some(snapshot)) => {
                self.memory.insert(symbol, snapshot.clone()).await;
                Some(snapshot)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(symbol, "Failed to read cached snapshot: {}", e);
                None
            }
        }
    }

    /// Store a snapshot in both tiers.
    pub async fn put_snapshot(&self, snapshot: &MarketSnapshot) -> Result<()> {
        self.memory.insert(&snapshot.symbol, snapshot.clone()).await;
        self.disk.save(&snapshot.symbol, snapshot).await?;
        Ok(())
    }

    /// Drop cached data for one ticker, or everything when `symbol` is `None`.
    ///
    /// Returns the number of files removed from disk.
    pub async fn clear(&self, symbol: Option<&str>) -> Result<usize> {
        match symbol {
            Some(symbol) => {
                self.memory.remove(symbol).await;
            }
            None => self.memory.clear().await,
        }
        self.disk.clear(symbol).await
    }
}

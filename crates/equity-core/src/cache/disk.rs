//! JSON snapshot cache on disk
//!
//! One file per ticker and day: `{TICKER}_{YYYYMMDD}.json`. Each file wraps
//! the payload with its save time so validity does not depend on filesystem
//! mtimes.

use crate::error::{ResearchError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    saved_at: DateTime<Utc>,
    payload: T,
}

/// Summary of what the cache directory holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_size_mb: f64,
    /// Files per ticker, sorted by ticker
    pub tickers: BTreeMap<String, usize>,
}

/// Expiring per-ticker JSON cache
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    expiry: Duration,
    keep_per_ticker: usize,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, expiry: Duration, keep_per_ticker: usize) -> Self {
        Self {
            dir: dir.into(),
            expiry,
            keep_per_ticker,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of today's file for `symbol`
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.path_for_day(symbol, Utc::now())
    }

    fn path_for_day(&self, symbol: &str, day: DateTime<Utc>) -> PathBuf {
        self.dir.join(format!(
            "{}_{}.json",
            symbol.to_uppercase(),
            day.format("%Y%m%d")
        ))
    }

    /// Load today's entry if it exists and has not expired.
    pub async fn load<T: DeserializeOwned>(&self, symbol: &str) -> Result<Option<T>> {
        let path = self.path_for(symbol);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(|e| {
            ResearchError::CacheError(format!("corrupt cache file {}: {e}", path.display()))
        })?;

        let age = Utc::now().signed_duration_since(envelope.saved_at);
        let expired = age
            .to_std()
            .map(|age| age >= self.expiry)
            .unwrap_or(false);
        if expired {
            tracing::debug!(symbol, "Disk cache entry expired");
            return Ok(None);
        }

        tracing::debug!(symbol, path = %path.display(), "Disk cache hit");
        Ok(Some(envelope.payload))
    }

    /// Write today's entry and prune old files for the ticker.
    pub async fn save<T: Serialize>(&self, symbol: &str, payload: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(symbol);
        let envelope = Envelope {
            saved_at: Utc::now(),
            payload,
        };
        fs::write(&path, serde_json::to_vec(&envelope)?).await?;
        self.cleanup(symbol).await?;
        Ok(path)
    }

    /// Keep only the newest `keep_per_ticker` files for `symbol`.
    pub async fn cleanup(&self, symbol: &str) -> Result<usize> {
        let mut files = self.files_for(Some(symbol)).await?;
        files.sort_by(|a, b| b.1.cmp(&a.1));

        let mut removed = 0;
        for (path, _) in files.into_iter().skip(self.keep_per_ticker) {
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %path.display(), "Failed to prune cache file: {}", e),
            }
        }
        Ok(removed)
    }

    /// Run [`cleanup`](Self::cleanup) for every ticker present.
    pub async fn cleanup_all(&self) -> Result<usize> {
        let tickers: Vec<String> = self.stats().await?.tickers.into_keys().collect();
        let mut removed = 0;
        for ticker in tickers {
            removed += self.cleanup(&ticker).await?;
        }
        Ok(removed)
    }

    /// Delete cache files for one ticker, or all of them.
    pub async fn clear(&self, symbol: Option<&str>) -> Result<usize> {
        let files = self.files_for(symbol).await?;
        let count = files.len();
        for (path, _) in files {
            fs::remove_file(&path).await?;
        }
        tracing::info!(symbol = symbol.unwrap_or("*"), count, "Cleared disk cache");
        Ok(count)
    }

    /// Count files and bytes, grouped by ticker.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        let mut total_bytes = 0_u64;

        for (path, _) in self.files_for(None).await? {
            let meta = fs::metadata(&path).await?;
            total_bytes += meta.len();
            stats.total_files += 1;
            if let Some(ticker) = ticker_of(&path) {
                *stats.tickers.entry(ticker).or_default() += 1;
            }
        }

        stats.total_size_mb = total_bytes as f64 / (1024.0 * 1024.0);
        Ok(stats)
    }

    /// Cache files with their modification times, optionally for one ticker.
    async fn files_for(&self, symbol: Option<&str>) -> Result<Vec<(PathBuf, SystemTime)>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let wanted = symbol.map(str::to_uppercase);
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(ticker) = ticker_of(&path) else {
                continue;
            };
            if wanted.as_ref().is_some_and(|w| *w != ticker) {
                continue;
            }
            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((path, modified));
        }
        Ok(files)
    }
}

/// `AAPL_20250101.json` -> `AAPL`; tickers may themselves contain `_`.
fn ticker_of(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (ticker, date) = stem.rsplit_once('_')?;
    (date.len() == 8 && date.chars().all(|c| c.is_ascii_digit())).then(|| ticker.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        price: f64,
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(3600), 20);

        let path = cache.save("aapl", &Payload { price: 190.0 }).await.unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("AAPL_"));

        let loaded: Option<Payload> = cache.load("AAPL").await.unwrap();
        assert_eq!(loaded, Some(Payload { price: 190.0 }));
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("nested"), Duration::from_secs(3600), 20);
        let loaded: Option<Payload> = cache.load("MSFT").await.unwrap();
        assert!(loaded.is_none());
        assert_eq!(cache.stats().await.unwrap().total_files, 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_ignored() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(3600), 20);

        let stale = Envelope {
            saved_at: Utc::now() - ChronoDuration::hours(7),
            payload: Payload { price: 1.0 },
        };
        std::fs::write(cache.path_for("KO"), serde_json::to_vec(&stale).unwrap()).unwrap();

        let loaded: Option<Payload> = cache.load("KO").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_cache_error() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(3600), 20);
        std::fs::write(cache.path_for("KO"), b"not json").unwrap();

        let result: Result<Option<Payload>> = cache.load("KO").await;
        assert!(matches!(result, Err(ResearchError::CacheError(_))));
    }

    #[tokio::test]
    async fn test_cleanup_keeps_newest() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(3600), 2);
        let now = Utc::now();

        for days_back in 1..=4 {
            let path = cache.path_for_day("JPM", now - ChronoDuration::days(days_back));
            std::fs::write(&path, b"{}").unwrap();
            let mtime = SystemTime::now() - Duration::from_secs(days_back as u64 * 86_400);
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(mtime)
                .unwrap();
        }

        let removed = cache.cleanup("JPM").await.unwrap();
        assert_eq!(removed, 2);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.tickers.get("JPM"), Some(&2));
        assert!(cache.path_for_day("JPM", now - ChronoDuration::days(1)).exists());
        assert!(!cache.path_for_day("JPM", now - ChronoDuration::days(4)).exists());
    }

    #[tokio::test]
    async fn test_clear_one_ticker_and_stats() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(3600), 20);
        cache.save("AAPL", &Payload { price: 1.0 }).await.unwrap();
        cache.save("BRK_B", &Payload { price: 2.0 }).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.tickers.get("BRK_B"), Some(&1));

        assert_eq!(cache.clear(Some("aapl")).await.unwrap(), 1);
        assert_eq!(cache.clear(None).await.unwrap(), 1);
        assert_eq!(cache.stats().await.unwrap().total_files, 0);
    }
}

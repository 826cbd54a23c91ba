//! Persisted cache of HTTP responses.
//!
//! Entries are keyed by URL and carry the time they were cached and the
//! time they stop being fresh. Stale entries are kept so they can be served
//! when a refresh fails.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use shared::{CacheEntry, Database};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Key-value store of fetched responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the entry for `url`
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>, StoreError>;

    /// Insert the entry, or overwrite data and timestamps of an existing one
    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError>;
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub stale_entries: usize,
    pub total_size_bytes: u64,
}

/// SQLite-backed cache stored in the `http_cache` table
pub struct SqliteCacheStore {
    db: Mutex<Database>,
}

impl SqliteCacheStore {
    /// Create a cache on top of an opened database
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Get cache statistics relative to `now`
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats, StoreError> {
        let db = self.db.lock().await;
        let (total, stale, bytes): (i64, i64, i64) = db.conn().query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN expires_at <= ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(LENGTH(CAST(data AS BLOB))), 0)
             FROM http_cache",
            params![now.timestamp_millis()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(CacheStats {
            total_entries: total as usize,
            stale_entries: stale as usize,
            total_size_bytes: bytes as u64,
        })
    }

    /// Clear all cache
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let db = self.db.lock().await;
        let removed = db.conn().execute("DELETE FROM http_cache", [])?;
        info!(removed = removed, "Cache cleared");
        Ok(removed)
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>, StoreError> {
        let db = self.db.lock().await;
        let row: Option<(String, i64, i64)> = db
            .conn()
            .query_row(
                "SELECT data, cached_at, expires_at FROM http_cache WHERE url = ?1",
                params![url],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((data, cached_at, expires_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            url: url.to_string(),
            data,
            cached_at: from_millis(url, cached_at)?,
            expires_at: from_millis(url, expires_at)?,
        }))
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        let db = self.db.lock().await;
        db.conn().execute(
            "INSERT INTO http_cache (url, data, cached_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(url) DO UPDATE SET
                data = excluded.data,
                cached_at = excluded.cached_at,
                expires_at = excluded.expires_at",
            params![
                entry.url,
                entry.data,
                entry.cached_at.timestamp_millis(),
                entry.expires_at.timestamp_millis(),
            ],
        )?;

        debug!(url = %entry.url, bytes = entry.data.len(), "Cache stored");
        Ok(())
    }
}

fn from_millis(url: &str, millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StoreError::Corrupt {
        url: url.to_string(),
        reason: format!("timestamp {} out of range", millis),
    })
}

/// In-memory cache, used in tests and for throwaway runs
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, url: &str) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.entries.lock().await.get(url).cloned())
    }

    async fn put(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(entry.url.clone(), entry.clone());
        Ok(())
    }
}

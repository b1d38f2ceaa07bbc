//! Best-effort TTL cache consumed by the search and enrichment paths.
//!
//! Every cacheable fetch follows the cache-aside pattern: check the cache,
//! fall back to the origin on a miss, write the result back before returning.
//! Cache failures never fail a request -- the [`get_json`]/[`put_json`]
//! helpers log them and degrade to a miss.

pub mod keys;

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Key-value store with per-entry TTL.
///
/// Values are opaque bytes; keys are namespaced by data class (see [`keys`])
/// so TTL policy can differ per class. Implementations are shared across
/// concurrent requests and must be internally synchronized.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a value, or `None` on miss / expiry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Remove a value immediately. Used only by forced-refresh paths.
    async fn invalidate(&self, key: &str) -> Result<()>;
}

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Thread-safe in-memory [`Cache`] with passive TTL expiry.
///
/// Expired entries are dropped lazily on read. When the map is at capacity,
/// the entry closest to expiry is evicted to make room.
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a new cache holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Number of live (possibly expired but not yet reaped) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_soonest_expiring(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.expires_at)
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(4096)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(key) {
            self.evict_soonest_expiring();
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Cache-aside read: fetch and deserialize a JSON value.
///
/// Cache or decode failures degrade to a miss with a `warn!` log.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Cache read failed; treating as miss");
            None
        }
    }
}

/// Cache-aside write: serialize and store a JSON value.
///
/// Failures are logged and swallowed; the caller already holds the value.
pub async fn put_json<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode value for cache");
            return;
        }
    };
    if let Err(e) = cache.set(key, bytes, ttl).await {
        warn!(key, error = %e, "Cache write failed; continuing without caching");
    }
}

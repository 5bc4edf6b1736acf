//! In-memory configuration cache
//!
//! Entries carry an absolute expiry. Expired entries are detected lazily on
//! `get` and reported as misses; nothing runs in the background.

use super::{CacheKey, CachedConfiguration, ConfigurationCache};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

static GLOBAL_CACHE: Lazy<MemoryConfigurationCache> = Lazy::new(MemoryConfigurationCache::new);

/// Cached configuration with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedConfiguration,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local TTL cache.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationCache {
    inner: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl MemoryConfigurationCache {
    /// Create a new, empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every provider in this process
    pub fn global() -> Self {
        GLOBAL_CACHE.clone()
    }

    /// Remove expired entries
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut cache = self.inner.write().await;
        let before = cache.len();

        cache.retain(|key, entry| {
            let expired = entry.is_expired(now);
            if expired {
                debug!(key = %key, "Removing expired cache entry");
            }
            !expired
        });

        before - cache.len()
    }

    /// Remove every entry
    pub async fn clear(&self) {
        let mut cache = self.inner.write().await;
        debug!(count = cache.len(), "Clearing configuration cache");
        cache.clear();
    }

    /// Number of stored entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ConfigurationCache for MemoryConfigurationCache {
    async fn get(&self, key: &CacheKey) -> Option<CachedConfiguration> {
        let cache = self.inner.read().await;

        match cache.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                debug!(key = %key, "Cache hit for configuration");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key = %key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: CacheKey, value: CachedConfiguration, expires_at: Instant) {
        let mut cache = self.inner.write().await;
        debug!(key = %key, "Caching configuration");
        cache.insert(key, CacheEntry { value, expires_at });
    }

    async fn remove(&self, key: &CacheKey) {
        let mut cache = self.inner.write().await;
        if cache.remove(key).is_some() {
            debug!(key = %key, "Removed cached configuration");
        }
    }

    async fn list_keys(&self) -> Vec<CacheKey> {
        self.inner.read().await.keys().copied().collect()
    }
}

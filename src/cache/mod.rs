//! Configuration cache
//!
//! A process-local, time-expiring map from [`CacheKey`] to a decrypted
//! configuration. The cache is advisory: a miss only costs a store read.
//! Individual operations are atomic; sequences of them (get, miss, load, set)
//! are not, and callers that need that serialise per key themselves.

pub mod key;
pub mod memory;

pub use key::{CacheKey, CachedConfiguration};
pub use memory::MemoryConfigurationCache;

use async_trait::async_trait;
use std::time::Instant;

/// Cache used by the configuration provider
#[async_trait]
pub trait ConfigurationCache: Send + Sync {
    /// Get a live entry; expired entries are misses
    async fn get(&self, key: &CacheKey) -> Option<CachedConfiguration>;

    /// Insert or replace an entry
    async fn set(&self, key: CacheKey, value: CachedConfiguration, expires_at: Instant);

    /// Remove an entry if present
    async fn remove(&self, key: &CacheKey);

    /// Keys currently stored, expired or not
    async fn list_keys(&self) -> Vec<CacheKey>;
}

/// Remove every secret-configuration entry, across all scopes.
///
/// Returns the number of keys removed.
pub async fn flush_secret_configurations(cache: &dyn ConfigurationCache) -> usize {
    let keys: Vec<CacheKey> = cache
        .list_keys()
        .await
        .into_iter()
        .filter(CacheKey::is_secret_configuration)
        .collect();

    for key in &keys {
        cache.remove(key).await;
    }

    tracing::debug!(
        count = keys.len(),
        "Flushed secret configuration cache entries"
    );
    keys.len()
}

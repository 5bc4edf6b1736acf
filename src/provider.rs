//! # Secret Configuration Provider
//!
//! Read-through / write-through access to the SQL and secret configurations.
//!
//! Reads consult the cache first. On a miss the stored payload is decrypted, or
//! passed through unchanged when it was stored unencrypted, then parsed and
//! cached. Reading the SQL configuration from the store also writes it back
//! encrypted, so unencrypted rows heal themselves after their first read. The
//! secret configuration read path never writes.
//!
//! Each cache key has its own async lock. Concurrent misses on a key share one
//! store load, and writes to a key hold the same lock so an in-flight load can
//! not replace a freshly written cache entry with the value it read earlier.
//!
//! ```rust,ignore
//! let provider = SecretConfigurationProvider::from_config(&config, pool, metrics)?;
//!
//! provider.set_secret_configuration(&secrets, Some(instance_id)).await?;
//! let secrets = provider.get_secret_configuration(Some(instance_id)).await?;
//! ```

use crate::cache::{
    flush_secret_configurations, CacheKey, CachedConfiguration, ConfigurationCache,
    MemoryConfigurationCache,
};
use crate::config::AppConfig;
use crate::domain::{InstanceRegistrationId, OdsSecretConfiguration, OdsSqlConfiguration};
use crate::errors::{Error, Result};
use crate::observability::MetricsRecorder;
use crate::services::{AesGcmStringEncryptor, StringEncryptor};
use crate::storage::{ConfigurationPayload, ConfigurationStore, DbPool, SqlxConfigurationStore};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};

/// Default lifetime of a cached configuration
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Provides decrypted SQL and secret configurations
pub struct SecretConfigurationProvider {
    store: Arc<dyn ConfigurationStore>,
    encryptor: Arc<dyn StringEncryptor>,
    cache: Arc<dyn ConfigurationCache>,
    ttl: Duration,
    key_locks: DashMap<CacheKey, Arc<Mutex<()>>>,
    metrics: MetricsRecorder,
}

/// Holds the lock for one cache key. The key's entry is dropped from the lock
/// map on release when no other task is holding or waiting for it.
struct KeyLockGuard<'a> {
    locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: CacheKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl std::fmt::Debug for SecretConfigurationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretConfigurationProvider")
            .field("ttl", &self.ttl)
            .field("locked_keys", &self.key_locks.len())
            .finish_non_exhaustive()
    }
}

impl SecretConfigurationProvider {
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        encryptor: Arc<dyn StringEncryptor>,
        cache: Arc<dyn ConfigurationCache>,
    ) -> Self {
        Self {
            store,
            encryptor,
            cache,
            ttl: DEFAULT_CACHE_TTL,
            key_locks: DashMap::new(),
            metrics: MetricsRecorder::disabled(),
        }
    }

    /// Provider over the Postgres store, sharing the process-wide cache
    pub fn from_config(
        config: &AppConfig,
        pool: DbPool,
        metrics: MetricsRecorder,
    ) -> Result<Self> {
        let encryptor = AesGcmStringEncryptor::new(&config.encryption)?;
        let store = SqlxConfigurationStore::new(pool).with_metrics(metrics.clone());

        Ok(Self::new(
            Arc::new(store),
            Arc::new(encryptor),
            Arc::new(MemoryConfigurationCache::global()),
        )
        .with_ttl(config.cache.ttl())
        .with_metrics(metrics))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the deployment-wide SQL configuration.
    ///
    /// A store read re-encrypts the row, whatever form it was stored in.
    #[instrument(skip(self), name = "get_sql_configuration")]
    pub async fn get_sql_configuration(&self) -> Result<Option<OdsSqlConfiguration>> {
        let key = CacheKey::SqlConfiguration;
        if let Some(config) = self
            .lookup(&key)
            .await
            .and_then(CachedConfiguration::into_sql)
        {
            return Ok(Some(config));
        }

        let _guard = self.lock_key(key).await;

        // Another task may have loaded it while we waited
        if let Some(config) = self
            .cache
            .get(&key)
            .await
            .and_then(CachedConfiguration::into_sql)
        {
            return Ok(Some(config));
        }

        let Some(raw) = self.store.find_sql_config_row().await? else {
            debug!("No SQL configuration stored");
            return Ok(None);
        };

        let payload = self.resolve(&key, &raw);
        let config: OdsSqlConfiguration = payload.parse("SQL configuration")?;
        let entry = CachedConfiguration::Sql(config.clone());
        self.cache.set(key, entry, self.expires_at()).await;

        let sealed = self.seal(&config, "SQL configuration")?;
        self.store.upsert_sql_config_row(&sealed).await?;
        info!(
            was_plaintext = payload.is_plaintext(),
            "Rewrote SQL configuration row encrypted"
        );

        Ok(Some(config))
    }

    /// Get the secret configuration for exactly this scope
    #[instrument(skip(self), name = "get_secret_configuration")]
    pub async fn get_secret_configuration(
        &self,
        scope: Option<InstanceRegistrationId>,
    ) -> Result<Option<OdsSecretConfiguration>> {
        let key = CacheKey::secret(scope);
        if let Some(config) = self
            .lookup(&key)
            .await
            .and_then(CachedConfiguration::into_secret)
        {
            return Ok(Some(config));
        }

        let _guard = self.lock_key(key).await;

        if let Some(config) = self
            .cache
            .get(&key)
            .await
            .and_then(CachedConfiguration::into_secret)
        {
            return Ok(Some(config));
        }

        let Some(raw) = self.store.find_secret_config_row(scope).await? else {
            debug!(key = %key, "No secret configuration stored");
            return Ok(None);
        };

        let config: OdsSecretConfiguration =
            self.resolve(&key, &raw).parse("secret configuration")?;
        let entry = CachedConfiguration::Secret(config.clone());
        self.cache.set(key, entry, self.expires_at()).await;

        Ok(Some(config))
    }

    /// Encrypt and store the secret configuration for this scope, then cache it
    #[instrument(skip(self, config), name = "set_secret_configuration")]
    pub async fn set_secret_configuration(
        &self,
        config: &OdsSecretConfiguration,
        scope: Option<InstanceRegistrationId>,
    ) -> Result<()> {
        let key = CacheKey::secret(scope);
        let sealed = self.seal(config, "secret configuration")?;

        let _guard = self.lock_key(key).await;

        self.store.upsert_secret_config_row(scope, &sealed).await?;
        let entry = CachedConfiguration::Secret(config.clone());
        self.cache.set(key, entry, self.expires_at()).await;

        info!(key = %key, "Stored secret configuration");
        Ok(())
    }

    /// Drop one cached entry; the next read goes to the store
    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.remove(key).await;
    }

    /// Drop every cached secret configuration. Returns how many were removed.
    pub async fn flush_cache(&self) -> usize {
        flush_secret_configurations(self.cache.as_ref()).await
    }

    /// Cache lookup that records a hit or miss
    async fn lookup(&self, key: &CacheKey) -> Option<CachedConfiguration> {
        let cached = self.cache.get(key).await;
        self.metrics
            .record_cache_lookup(key.kind(), cached.is_some());
        if cached.is_none() {
            debug!(key = %key, "Configuration cache miss");
        }
        cached
    }

    async fn lock_key(&self, key: CacheKey) -> KeyLockGuard<'_> {
        let lock = Arc::clone(&self.key_locks.entry(key).or_default());
        KeyLockGuard {
            locks: &self.key_locks,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn expires_at(&self) -> Instant {
        Instant::now() + self.ttl
    }

    fn resolve(&self, key: &CacheKey, raw: &str) -> ConfigurationPayload {
        let payload = ConfigurationPayload::resolve(raw, self.encryptor.as_ref());
        if payload.is_plaintext() {
            warn!(
                key = %key,
                "Stored configuration is not encrypted; reading it as plain JSON"
            );
            self.metrics.record_legacy_payload(key.kind());
        }
        payload
    }

    fn seal<T: serde::Serialize>(&self, config: &T, what: &str) -> Result<String> {
        let json = serde_json::to_string(config)
            .map_err(|e| Error::serialization(e, format!("Failed to serialize {}", what)))?;
        self.encryptor.encrypt(&json)
    }
}

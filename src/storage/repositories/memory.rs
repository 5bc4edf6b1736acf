//! In-memory configuration store
//!
//! Used by tests and local tooling. Behaves like the Postgres store: one row
//! per scope, last write wins. It can be switched offline to exercise
//! persistence-failure paths.

use super::configuration::ConfigurationStore;
use crate::domain::InstanceRegistrationId;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Rows {
    sql: Option<String>,
    secrets: HashMap<Option<InstanceRegistrationId>, String>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: RwLock<Rows>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
    read_delay: Option<Duration>,
}

/// Process-local configuration store.
///
/// Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigurationStore {
    inner: Arc<Inner>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose reads sleep first, widening race windows in tests
    pub fn with_read_delay(delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                read_delay: Some(delay),
                ..Default::default()
            }),
        }
    }

    /// Make every operation fail with [`Error::StoreUnavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current SQL configuration payload
    pub async fn sql_row(&self) -> Option<String> {
        self.inner.rows.read().await.sql.clone()
    }

    /// Current secret configuration payload for a scope
    pub async fn secret_row(&self, scope: Option<InstanceRegistrationId>) -> Option<String> {
        self.inner.rows.read().await.secrets.get(&scope).cloned()
    }

    /// Number of secret configuration rows across all scopes
    pub async fn secret_row_count(&self) -> usize {
        self.inner.rows.read().await.secrets.len()
    }

    /// Row reads served so far
    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Row writes committed so far
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable(
                "in-memory configuration store is offline",
            ));
        }
        Ok(())
    }

    async fn before_read(&self) -> Result<()> {
        self.check_available()?;
        if let Some(delay) = self.inner.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn find_sql_config_row(&self) -> Result<Option<String>> {
        self.before_read().await?;
        Ok(self.inner.rows.read().await.sql.clone())
    }

    async fn find_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
    ) -> Result<Option<String>> {
        self.before_read().await?;
        Ok(self.inner.rows.read().await.secrets.get(&scope).cloned())
    }

    async fn upsert_sql_config_row(&self, payload: &str) -> Result<()> {
        self.check_available()?;
        self.inner.rows.write().await.sql = Some(payload.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn upsert_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
        payload: &str,
    ) -> Result<()> {
        self.check_available()?;
        self.inner
            .rows
            .write()
            .await
            .secrets
            .insert(scope, payload.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

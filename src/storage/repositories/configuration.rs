//! Configuration repository
//!
//! Raw access to the two configuration tables. Payloads are opaque text here;
//! decoding happens in the provider.

use crate::db_span;
use crate::domain::InstanceRegistrationId;
use crate::errors::{Error, Result};
use crate::observability::MetricsRecorder;
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use std::time::Instant;
use tracing::{instrument, Instrument};

// Database row structure

#[derive(Debug, Clone, FromRow)]
struct ConfigurationRow {
    pub payload: String,
}

// Repository trait

/// Persistent store for configuration payloads
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Payload of the singleton SQL configuration row
    async fn find_sql_config_row(&self) -> Result<Option<String>>;

    /// Payload of the secret configuration row for exactly this scope
    async fn find_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
    ) -> Result<Option<String>>;

    /// Insert or replace the SQL configuration row
    async fn upsert_sql_config_row(&self, payload: &str) -> Result<()>;

    /// Insert or replace the secret configuration row for this scope
    async fn upsert_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
        payload: &str,
    ) -> Result<()>;
}

/// PostgreSQL-backed configuration store
#[derive(Debug, Clone)]
pub struct SqlxConfigurationStore {
    pool: DbPool,
    metrics: MetricsRecorder,
}

impl SqlxConfigurationStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            metrics: MetricsRecorder::disabled(),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = metrics;
        self
    }

    fn record<T>(&self, operation: &str, started: Instant, result: &Result<T>) {
        self.metrics.record_store_operation(
            operation,
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );
    }
}

#[async_trait]
impl ConfigurationStore for SqlxConfigurationStore {
    #[instrument(skip(self), name = "db_find_sql_config_row")]
    async fn find_sql_config_row(&self) -> Result<Option<String>> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, ConfigurationRow>(
            "SELECT configurations AS payload FROM sql_configurations WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .instrument(db_span!("find_sql_config_row"))
        .await
        .map(|row| row.map(|r| r.payload))
        .map_err(|e| Error::database(e, "Failed to read SQL configuration row"));

        self.record("find_sql_config_row", started, &result);
        result
    }

    #[instrument(skip(self), name = "db_find_secret_config_row")]
    async fn find_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
    ) -> Result<Option<String>> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, ConfigurationRow>(
            "SELECT encrypted_data AS payload FROM secret_configurations \
             WHERE ods_instance_registration_id IS NOT DISTINCT FROM $1",
        )
        .bind(scope)
        .fetch_optional(&self.pool)
        .instrument(db_span!("find_secret_config_row", scope = ?scope))
        .await
        .map(|row| row.map(|r| r.payload))
        .map_err(|e| {
            Error::database(e, format!("Failed to read secret configuration row for {:?}", scope))
        });

        self.record("find_secret_config_row", started, &result);
        result
    }

    #[instrument(skip(self, payload), name = "db_upsert_sql_config_row")]
    async fn upsert_sql_config_row(&self, payload: &str) -> Result<()> {
        let started = Instant::now();
        let result = sqlx::query(
            "INSERT INTO sql_configurations (id, configurations, created_at, updated_at) \
             VALUES (1, $1, NOW(), NOW()) \
             ON CONFLICT (id) DO UPDATE \
             SET configurations = EXCLUDED.configurations, updated_at = NOW()",
        )
        .bind(payload)
        .execute(&self.pool)
        .instrument(db_span!("upsert_sql_config_row"))
        .await
        .map(|_| ())
        .map_err(|e| Error::database(e, "Failed to write SQL configuration row"));

        self.record("upsert_sql_config_row", started, &result);
        result
    }

    #[instrument(skip(self, payload), name = "db_upsert_secret_config_row")]
    async fn upsert_secret_config_row(
        &self,
        scope: Option<InstanceRegistrationId>,
        payload: &str,
    ) -> Result<()> {
        let started = Instant::now();
        let result = sqlx::query(
            "INSERT INTO secret_configurations \
             (ods_instance_registration_id, encrypted_data, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) \
             ON CONFLICT ((COALESCE(ods_instance_registration_id::BIGINT, -2147483649))) \
             DO UPDATE \
             SET encrypted_data = EXCLUDED.encrypted_data, updated_at = NOW()",
        )
        .bind(scope)
        .bind(payload)
        .execute(&self.pool)
        .instrument(db_span!("upsert_secret_config_row", scope = ?scope))
        .await
        .map(|_| ())
        .map_err(|e| {
            Error::database(e, format!("Failed to write secret configuration row for {:?}", scope))
        });

        self.record("upsert_secret_config_row", started, &result);
        result
    }
}

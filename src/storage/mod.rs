//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for SQL and secret
//! configuration payloads.

pub mod migrations;
pub mod payload;
pub mod pool;
pub mod repositories;

pub use crate::config::DatabaseConfig;

pub use migrations::{
    get_migration_version, list_applied_migrations, run_migrations as run_db_migrations,
    validate_migrations, MigrationInfo,
};
pub use payload::ConfigurationPayload;
pub use pool::{create_pool, DbPool};
pub use repositories::{ConfigurationStore, InMemoryConfigurationStore, SqlxConfigurationStore};

use crate::errors::{Error, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::database(e, "Database connectivity check failed"))?;

    Ok(())
}

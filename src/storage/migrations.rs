//! # Database Migration Management
//!
//! Schema migrations are embedded in the binary from `migrations/` at build
//! time and applied through sqlx's migrator, which tracks applied versions in
//! `_sqlx_migrations`.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use serde::{Deserialize, Serialize};
use sqlx::migrate::Migrator;
use sqlx::Row;
use tracing::{error, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Migration information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub installed_on: chrono::DateTime<chrono::Utc>,
    pub execution_time: i64,
    pub success: bool,
}

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!(embedded = MIGRATOR.iter().count(), "Starting database migration process");

    MIGRATOR.run(pool).await.map_err(|e| {
        error!(error = %e, "Migration failed");
        Error::from(e)
    })?;

    info!(version = latest_embedded_version(), "Database migrations completed");
    Ok(())
}

/// Highest migration version compiled into this binary
pub fn latest_embedded_version() -> i64 {
    MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0)
}

/// Get the current migration version (highest applied)
pub async fn get_migration_version(pool: &DbPool) -> Result<i64> {
    let applied = list_applied_migrations(pool).await?;
    Ok(applied
        .into_iter()
        .filter(|m| m.success)
        .map(|m| m.version)
        .max()
        .unwrap_or(0))
}

/// Validate that every embedded migration is applied and nothing unknown is
pub async fn validate_migrations(pool: &DbPool) -> Result<bool> {
    let applied: Vec<i64> = list_applied_migrations(pool)
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    for migration in MIGRATOR.iter() {
        if !applied.contains(&migration.version) {
            warn!(version = migration.version, "Missing migration");
            return Ok(false);
        }
    }

    for version in &applied {
        if !MIGRATOR.iter().any(|m| m.version == *version) {
            warn!(version = version, "Unexpected migration found");
            return Ok(false);
        }
    }

    Ok(true)
}

/// List all applied migrations
pub async fn list_applied_migrations(pool: &DbPool) -> Result<Vec<MigrationInfo>> {
    let rows = sqlx::query(
        "SELECT version, description, installed_on, execution_time, success \
         FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await;

    match rows {
        Ok(rows) => Ok(rows
            .into_iter()
            .map(|row| MigrationInfo {
                version: row.get("version"),
                description: row.get("description"),
                installed_on: row.get("installed_on"),
                execution_time: row.get("execution_time"),
                success: row.get("success"),
            })
            .collect()),
        Err(sqlx::Error::Database(db_err))
            if db_err
                .message()
                .contains("relation \"_sqlx_migrations\" does not exist") =>
        {
            // Table doesn't exist yet
            Ok(Vec::new())
        }
        Err(e) => Err(Error::database(e, "Failed to list applied migrations")),
    }
}

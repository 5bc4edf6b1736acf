//! # ODS Admin Configuration Store
//!
//! Encrypted, cached storage for the configuration the ODS admin application
//! needs at runtime: the deployment-wide SQL connection configuration and the
//! per-instance secret configuration (API keys, bulk-upload and
//! learning-standards credentials).
//!
//! ## Architecture
//!
//! ```text
//! SecretConfigurationProvider ──► ConfigurationCache (TTL, in-process)
//!            │
//!            ├──► StringEncryptor (AES-256-GCM)
//!            └──► ConfigurationStore (PostgreSQL / in-memory)
//! ```
//!
//! Payloads are encrypted at rest. Rows written by older deployments as plain
//! JSON remain readable; the SQL configuration row is re-encrypted the first
//! time it is read from the store.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ods_admin_config::{
//!     config::AppConfig, storage::create_pool, MetricsRecorder, Result,
//!     SecretConfigurationProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let pool = create_pool(&config.database).await?;
//!     let metrics = MetricsRecorder::new();
//!     let provider = SecretConfigurationProvider::from_config(&config, pool, metrics)?;
//!
//!     if let Some(sql) = provider.get_sql_configuration().await? {
//!         println!("admin database host: {}", sql.host_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod provider;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used types and traits
pub use cache::{CacheKey, ConfigurationCache, MemoryConfigurationCache};
pub use config::AppConfig;
pub use domain::{InstanceRegistrationId, OdsSecretConfiguration, OdsSqlConfiguration};
pub use errors::{Error, Result};
pub use observability::MetricsRecorder;
pub use provider::SecretConfigurationProvider;
pub use services::{AesGcmStringEncryptor, StringEncryptor};
pub use storage::{ConfigurationStore, InMemoryConfigurationStore, SqlxConfigurationStore};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

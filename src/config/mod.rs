//! # Configuration Management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `ODS_ADMIN__*` environment variables (`__` separates nested keys, e.g.
//! `ODS_ADMIN__DATABASE__URL`). The encryption key may also come from the flat
//! `ODS_ADMIN_ENCRYPTION_KEY` variable.

pub mod settings;

pub use settings::{
    AppConfig, CacheConfig, DatabaseConfig, EncryptionConfig, ObservabilityConfig,
    ENCRYPTION_KEY_ENV, ENCRYPTION_KEY_VERSION_ENV,
};

use crate::errors::Result;
use std::path::Path;

/// Prefix for nested environment overrides
pub const ENV_PREFIX: &str = "ODS_ADMIN";

impl AppConfig {
    /// Load configuration from an optional file plus the environment, then validate it
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        if app_config.encryption.key_base64.is_empty() {
            if let Ok(env_encryption) = EncryptionConfig::from_env() {
                app_config.encryption = env_encryption;
            }
        }
        if app_config.encryption.key_version.is_empty() {
            app_config.encryption.key_version = "default".to_string();
        }

        app_config.validate()?;

        tracing::debug!(
            config_file = ?path.map(|p| p.display().to_string()),
            cache_ttl_secs = app_config.cache.ttl_seconds,
            key_version = %app_config.encryption.key_version,
            "Loaded application configuration"
        );

        Ok(app_config)
    }
}

//! # Configuration Settings
//!
//! Defines the configuration structure for the configuration store.

use crate::errors::{Error, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Environment variable holding the base64-encoded 32-byte encryption key
pub const ENCRYPTION_KEY_ENV: &str = "ODS_ADMIN_ENCRYPTION_KEY";

/// Environment variable holding the key version label
pub const ENCRYPTION_KEY_VERSION_ENV: &str = "ODS_ADMIN_ENCRYPTION_KEY_VERSION";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Configuration cache settings
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Encryption-at-rest settings
    #[validate(nested)]
    pub encryption: EncryptionConfig,

    /// Logging and metrics configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;

        self.validate_custom()?;

        Ok(())
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.is_postgresql() {
            return Err(Error::validation_field(
                "Database URL must start with 'postgresql://' or 'postgres://'",
                "database.url",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(Error::validation_field(
                "min_connections cannot be greater than max_connections",
                "database.min_connections",
            ));
        }

        self.encryption.key_bytes()?;

        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[validate(range(min = 0, max = 50, message = "Min connections must be between 0 and 50"))]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(
        min = 1,
        max = 60,
        message = "Connect timeout must be between 1 and 60 seconds"
    ))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/ods_admin".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600, // 10 minutes
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }

    /// Check if this is a PostgreSQL configuration
    pub fn is_postgresql(&self) -> bool {
        self.url.starts_with("postgresql://") || self.url.starts_with("postgres://")
    }
}

/// Configuration cache settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached configurations in seconds
    #[validate(range(
        min = 1,
        max = 86400,
        message = "Cache TTL must be between 1 and 86400 seconds"
    ))]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl CacheConfig {
    /// Get the TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Configuration for the string encryptor
#[derive(Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Base64-encoded 32-byte master encryption key
    pub key_base64: String,

    /// Key version for rotation tracking
    pub key_version: String,
}

impl EncryptionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let key_base64 = std::env::var(ENCRYPTION_KEY_ENV).map_err(|_| {
            Error::config(format!(
                "{} environment variable not set. \
                 Generate a key with: ods-admin-config generate-key",
                ENCRYPTION_KEY_ENV
            ))
        })?;

        let key_version =
            std::env::var(ENCRYPTION_KEY_VERSION_ENV).unwrap_or_else(|_| "default".to_string());

        Ok(Self { key_base64, key_version })
    }

    /// Decode and length-check the key
    pub fn key_bytes(&self) -> Result<zeroize::Zeroizing<Vec<u8>>> {
        if self.key_base64.is_empty() {
            return Err(Error::validation_field(
                format!("Encryption key is not set (use {})", ENCRYPTION_KEY_ENV),
                "encryption.key_base64",
            ));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.key_base64.trim())
            .map(zeroize::Zeroizing::new)
            .map_err(|e| {
                Error::validation_field(
                    format!("Invalid base64 in encryption key: {}", e),
                    "encryption.key_base64",
                )
            })?;

        if bytes.len() != 32 {
            return Err(Error::validation_field(
                format!(
                    "Encryption key must be 32 bytes (256 bits), got {} bytes",
                    bytes.len()
                ),
                "encryption.key_base64",
            ));
        }

        Ok(bytes)
    }

    /// Create a development/testing configuration with a fixed key
    /// WARNING: Only use this for development/testing, never in production!
    pub fn for_testing() -> Self {
        let test_key = [0x42u8; 32];
        Self {
            key_base64: base64::engine::general_purpose::STANDARD.encode(test_key),
            key_version: "test".to_string(),
        }
    }
}

impl std::fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("key_base64", &"[REDACTED]")
            .field("key_version", &self.key_version)
            .finish()
    }
}

/// Observability configuration for logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Record cache and store metrics through the `metrics` facade
    pub enable_metrics: bool,

    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            service_name: "ods-admin-config".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            encryption: EncryptionConfig::for_testing(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_needs_a_key() {
        let result = AppConfig::default().validate();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_postgres_url() {
        let mut config = valid_config();
        config.database.url = "mysql://localhost/db".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let mut config = valid_config();
        config.cache.ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_short_key() {
        let mut config = valid_config();
        config.encryption.key_base64 =
            base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }

    #[test]
    fn test_encryption_config_debug_is_redacted() {
        let config = EncryptionConfig::for_testing();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&config.key_base64));
    }

    #[test]
    fn test_durations() {
        assert_eq!(CacheConfig::default().ttl(), Duration::from_secs(300));
        let db = DatabaseConfig {
            idle_timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(db.idle_timeout(), None);
        assert_eq!(db.connect_timeout(), Duration::from_secs(10));
    }
}

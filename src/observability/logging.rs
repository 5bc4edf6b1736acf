//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can raise
//! verbosity for a single module (`RUST_LOG=ods_admin_config::cache=debug`)
//! without touching the settings file.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Create a tracing span for database operations.
///
/// ```rust,ignore
/// let span = db_span!("upsert_secret_configuration", scope = ?scope);
/// ```
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Build the filter from `RUST_LOG`, falling back to the configured level
pub fn build_env_filter(config: &ObservabilityConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", config.log_level, e))
        }),
    }
}

/// Install the global tracing subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (for example by a
/// test harness); that is not an error.
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = build_env_filter(config)?;

    let result = if config.json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    Ok(result.is_ok())
}

/// Log configuration at startup (no secrets)
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        database_max_connections = config.database.max_connections,
        auto_migrate = config.database.auto_migrate,
        cache_ttl_secs = config.cache.ttl_seconds,
        key_version = %config.encryption.key_version,
        metrics_enabled = config.observability.enable_metrics,
        "ODS admin configuration store settings"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = db_span!("find_sql_configuration");
        let _span = db_span!("upsert_secret_configuration", scope = "42");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ObservabilityConfig {
            log_level: "ods_admin_config=notalevel".to_string(),
            ..Default::default()
        };
        assert!(build_env_filter(&config).is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = ObservabilityConfig::default();
        let first = init_logging(&config);
        let second = init_logging(&config).unwrap();
        assert!(first.is_ok());
        assert!(!second);
    }
}

//! Typed cache keys.

use crate::domain::{InstanceRegistrationId, OdsSecretConfiguration, OdsSqlConfiguration};
use std::fmt;

const SQL_CONFIGURATION_KEY: &str = "OdsSqlConfiguration";
const SECRET_CONFIGURATION_KEY: &str = "OdsSecretConfiguration";

/// Identifies one cached configuration.
///
/// Each scope gets its own variant value, so two instances can never share an
/// entry. [`fmt::Display`] renders the legacy string form
/// (`OdsSqlConfiguration`, `OdsSecretConfiguration`,
/// `OdsSecretConfiguration_<id>`) for logs and operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    SqlConfiguration,
    SecretConfiguration(Option<InstanceRegistrationId>),
}

impl CacheKey {
    /// Key for the secret configuration of a scope
    pub fn secret(scope: Option<InstanceRegistrationId>) -> Self {
        Self::SecretConfiguration(scope)
    }

    /// True for any secret-configuration key, whatever its scope
    pub fn is_secret_configuration(&self) -> bool {
        matches!(self, Self::SecretConfiguration(_))
    }

    /// Label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SqlConfiguration => "sql",
            Self::SecretConfiguration(_) => "secret",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlConfiguration => f.write_str(SQL_CONFIGURATION_KEY),
            Self::SecretConfiguration(None) => f.write_str(SECRET_CONFIGURATION_KEY),
            Self::SecretConfiguration(Some(id)) => write!(f, "{}_{}", SECRET_CONFIGURATION_KEY, id),
        }
    }
}

/// A cached configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum CachedConfiguration {
    Sql(OdsSqlConfiguration),
    Secret(OdsSecretConfiguration),
}

impl CachedConfiguration {
    pub fn into_sql(self) -> Option<OdsSqlConfiguration> {
        match self {
            Self::Sql(config) => Some(config),
            Self::Secret(_) => None,
        }
    }

    pub fn into_secret(self) -> Option<OdsSecretConfiguration> {
        match self {
            Self::Secret(config) => Some(config),
            Self::Sql(_) => None,
        }
    }
}

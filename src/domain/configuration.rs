//! Configuration shapes held by the store.
//!
//! Field names serialise in PascalCase and absent values serialise as `null`,
//! matching rows written by earlier versions of the admin application. Those
//! rows may omit members or hold `null` for them, so every member deserialises
//! leniently: missing or `null` strings become empty and missing or `null`
//! records become `None`.

use crate::utils::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API key and secret pair
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OdsApiCredential {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub secret: String,
}

impl OdsApiCredential {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for OdsApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdsApiCredential")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Credentials used by the bulk-upload process
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BulkUploadCredential {
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub api_secret: String,
}

impl BulkUploadCredential {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for BulkUploadCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkUploadCredential")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Learning-standards provider credential.
///
/// The record is opaque to this crate: fields it does not know about are kept in
/// `additional` and written back unchanged.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LearningStandardsCredential {
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub api_secret: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub synchronization_was_successful: bool,

    #[serde(default, with = "crate::utils::ms_date::option")]
    pub last_modified_date: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for LearningStandardsCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearningStandardsCredential")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field(
                "synchronization_was_successful",
                &self.synchronization_was_successful,
            )
            .field("last_modified_date", &self.last_modified_date)
            .field(
                "additional_fields",
                &self.additional.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Per-instance secret configuration. Every field may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OdsSecretConfiguration {
    #[serde(default)]
    pub production_api_key_and_secret: Option<OdsApiCredential>,

    #[serde(default)]
    pub bulk_upload_credential: Option<BulkUploadCredential>,

    #[serde(default)]
    pub learning_standards_credential: Option<LearningStandardsCredential>,

    #[serde(default)]
    pub production_academic_benchmark_api_client_key_and_secret: Option<OdsApiCredential>,
}

/// Database login
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SqlCredential {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,
}

impl SqlCredential {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for SqlCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCredential")
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Global database connection configuration (one per deployment)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OdsSqlConfiguration {
    #[serde(default, deserialize_with = "null_as_default")]
    pub host_name: String,

    #[serde(default)]
    pub admin_credentials: Option<SqlCredential>,

    #[serde(default)]
    pub production_api_credentials: Option<SqlCredential>,

    #[serde(default)]
    pub admin_app_credentials: Option<SqlCredential>,
}

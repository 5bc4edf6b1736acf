//! Common test utilities for all integration tests.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

#[cfg(feature = "postgres_tests")]
pub mod test_db;

use ods_admin_config::config::EncryptionConfig;
use ods_admin_config::domain::{
    BulkUploadCredential, LearningStandardsCredential, OdsApiCredential, OdsSecretConfiguration,
    OdsSqlConfiguration, SqlCredential,
};
use ods_admin_config::{
    AesGcmStringEncryptor, InMemoryConfigurationStore, MemoryConfigurationCache,
    SecretConfigurationProvider,
};
use std::sync::Arc;

/// Provider wired to an in-memory store and cache, with handles to both
pub struct ProviderHarness {
    pub store: InMemoryConfigurationStore,
    pub cache: MemoryConfigurationCache,
    pub encryptor: Arc<AesGcmStringEncryptor>,
    pub provider: Arc<SecretConfigurationProvider>,
}

impl ProviderHarness {
    pub fn new() -> Self {
        Self::with_store(InMemoryConfigurationStore::new())
    }

    pub fn with_store(store: InMemoryConfigurationStore) -> Self {
        let cache = MemoryConfigurationCache::new();
        let encryptor = Arc::new(
            AesGcmStringEncryptor::new(&EncryptionConfig::for_testing())
                .expect("test encryption key is valid"),
        );
        let provider = Arc::new(SecretConfigurationProvider::new(
            Arc::new(store.clone()),
            encryptor.clone(),
            Arc::new(cache.clone()),
        ));
        Self {
            store,
            cache,
            encryptor,
            provider,
        }
    }

    /// A second provider over the same store with its own empty cache
    pub fn fresh_provider(&self) -> SecretConfigurationProvider {
        SecretConfigurationProvider::new(
            Arc::new(self.store.clone()),
            self.encryptor.clone(),
            Arc::new(MemoryConfigurationCache::new()),
        )
    }
}

pub fn sample_sql_configuration() -> OdsSqlConfiguration {
    OdsSqlConfiguration {
        host_name: "sql.district.example.org".to_string(),
        admin_credentials: Some(SqlCredential::new("ods_admin", "admin-password")),
        production_api_credentials: Some(SqlCredential::new("ods_api", "api-password")),
        admin_app_credentials: Some(SqlCredential::new("ods_admin_app", "app-password")),
    }
}

pub fn sample_secret_configuration(tag: &str) -> OdsSecretConfiguration {
    OdsSecretConfiguration {
        production_api_key_and_secret: Some(OdsApiCredential::new(
            format!("{}-key", tag),
            format!("{}-secret", tag),
        )),
        bulk_upload_credential: Some(BulkUploadCredential::new(
            format!("{}-bulk-key", tag),
            format!("{}-bulk-secret", tag),
        )),
        learning_standards_credential: Some(LearningStandardsCredential {
            api_key: format!("{}-ls-key", tag),
            api_secret: format!("{}-ls-secret", tag),
            synchronization_was_successful: true,
            ..Default::default()
        }),
        production_academic_benchmark_api_client_key_and_secret: None,
    }
}

//! Output formatting for CLI commands

use crate::domain::{
    BulkUploadCredential, LearningStandardsCredential, OdsApiCredential, OdsSecretConfiguration,
    OdsSqlConfiguration, SqlCredential,
};
use crate::storage::MigrationInfo;
use crate::utils::mask_secret;
use anyhow::{Context, Result};
use serde::Serialize;

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Copy of the SQL configuration with passwords masked
pub fn masked_sql(config: &OdsSqlConfiguration) -> OdsSqlConfiguration {
    let mask = |c: &Option<SqlCredential>| {
        c.as_ref()
            .map(|c| SqlCredential::new(c.user_name.clone(), mask_secret(&c.password)))
    };
    OdsSqlConfiguration {
        host_name: config.host_name.clone(),
        admin_credentials: mask(&config.admin_credentials),
        production_api_credentials: mask(&config.production_api_credentials),
        admin_app_credentials: mask(&config.admin_app_credentials),
    }
}

/// Copy of the secret configuration with secrets masked
pub fn masked_secret(config: &OdsSecretConfiguration) -> OdsSecretConfiguration {
    let api = |c: &OdsApiCredential| OdsApiCredential::new(c.key.clone(), mask_secret(&c.secret));

    OdsSecretConfiguration {
        production_api_key_and_secret: config.production_api_key_and_secret.as_ref().map(api),
        bulk_upload_credential: config
            .bulk_upload_credential
            .as_ref()
            .map(|c| BulkUploadCredential::new(c.api_key.clone(), mask_secret(&c.api_secret))),
        learning_standards_credential: config.learning_standards_credential.as_ref().map(|c| {
            LearningStandardsCredential {
                api_secret: mask_secret(&c.api_secret),
                ..c.clone()
            }
        }),
        production_academic_benchmark_api_client_key_and_secret: config
            .production_academic_benchmark_api_client_key_and_secret
            .as_ref()
            .map(api),
    }
}

/// Print migrations in a formatted table
pub fn print_migrations_table(migrations: &[MigrationInfo]) {
    if migrations.is_empty() {
        println!("No migrations have been applied");
        return;
    }

    println!();
    println!(
        "{:<15} {:<50} {:<25} {:<10}",
        "Version", "Description", "Applied On", "Time (ns)"
    );
    println!("{}", "-".repeat(100));

    for migration in migrations {
        println!(
            "{:<15} {:<50} {:<25} {:<10}",
            migration.version,
            truncate_string(&migration.description, 48),
            migration.installed_on.format("%Y-%m-%d %H:%M:%S"),
            migration.execution_time
        );
    }
}

/// Truncate a string to a maximum length
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_sql_keeps_user_names() {
        let config = OdsSqlConfiguration {
            host_name: "db".to_string(),
            admin_credentials: Some(SqlCredential::new("admin", "correct-horse")),
            ..Default::default()
        };

        let masked = masked_sql(&config);

        let admin = masked.admin_credentials.unwrap();
        assert_eq!(admin.user_name, "admin");
        assert_eq!(admin.password, "corr****");
        assert_eq!(masked.host_name, "db");
        assert!(masked.production_api_credentials.is_none());
    }

    #[test]
    fn test_masked_secret() {
        let config = OdsSecretConfiguration {
            production_api_key_and_secret: Some(OdsApiCredential::new("key", "super-secret")),
            learning_standards_credential: Some(LearningStandardsCredential {
                api_key: "ls-key".to_string(),
                api_secret: "ls-secret".to_string(),
                synchronization_was_successful: true,
                ..Default::default()
            }),
            ..Default::default()
        };

        let masked = masked_secret(&config);

        let api = masked.production_api_key_and_secret.unwrap();
        assert_eq!(api.key, "key");
        assert_eq!(api.secret, "supe****");
        let standards = masked.learning_standards_credential.unwrap();
        assert_eq!(standards.api_secret, "ls-s****");
        assert!(standards.synchronization_was_successful);
        assert!(masked.bulk_upload_credential.is_none());
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(
            truncate_string("create_configuration_tables", 10),
            "create_..."
        );
    }
}

//! PostgreSQL configuration store tests.
//!
//! Run with: cargo test --features postgres_tests

#![cfg(feature = "postgres_tests")]

mod common;

use common::test_db::TestDatabase;
use common::{sample_secret_configuration, sample_sql_configuration};
use ods_admin_config::config::EncryptionConfig;
use ods_admin_config::domain::InstanceRegistrationId;
use ods_admin_config::storage::{check_connection, get_migration_version, validate_migrations};
use ods_admin_config::{
    AesGcmStringEncryptor, ConfigurationStore, MemoryConfigurationCache,
    SecretConfigurationProvider, SqlxConfigurationStore,
};
use std::sync::Arc;

async fn count_rows(db: &TestDatabase, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&db.pool)
        .await
        .unwrap()
}

fn provider_for(db: &TestDatabase) -> SecretConfigurationProvider {
    SecretConfigurationProvider::new(
        Arc::new(SqlxConfigurationStore::new(db.pool.clone())),
        Arc::new(AesGcmStringEncryptor::new(&EncryptionConfig::for_testing()).unwrap()),
        Arc::new(MemoryConfigurationCache::new()),
    )
}

#[tokio::test]
async fn test_migrations_applied() {
    let db = TestDatabase::new("migrations_applied").await;

    check_connection(&db.pool).await.unwrap();
    assert!(validate_migrations(&db.pool).await.unwrap());
    assert_eq!(
        get_migration_version(&db.pool).await.unwrap(),
        20250101000001
    );
}

#[tokio::test]
async fn test_empty_tables() {
    let db = TestDatabase::new("empty_tables").await;
    let store = SqlxConfigurationStore::new(db.pool.clone());

    assert_eq!(store.find_sql_config_row().await.unwrap(), None);
    assert_eq!(store.find_secret_config_row(None).await.unwrap(), None);
    assert_eq!(
        store
            .find_secret_config_row(Some(InstanceRegistrationId::new(1)))
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_upsert_keeps_one_row_per_scope() {
    let db = TestDatabase::new("upsert_one_row").await;
    let store = SqlxConfigurationStore::new(db.pool.clone());
    let instance = Some(InstanceRegistrationId::new(3));

    for (scope, payload) in [
        (None, "shared-1"),
        (None, "shared-2"),
        (instance, "instance-1"),
        (instance, "instance-2"),
    ] {
        store
            .upsert_secret_config_row(scope, payload)
            .await
            .unwrap();
    }

    assert_eq!(
        store.find_secret_config_row(None).await.unwrap().as_deref(),
        Some("shared-2")
    );
    assert_eq!(
        store
            .find_secret_config_row(instance)
            .await
            .unwrap()
            .as_deref(),
        Some("instance-2")
    );
    assert_eq!(count_rows(&db, "secret_configurations").await, 2);
}

#[tokio::test]
async fn test_shared_scope_and_negative_ids_are_distinct() {
    let db = TestDatabase::new("negative_scope").await;
    let provider = provider_for(&db);
    let minus_one = Some(InstanceRegistrationId::new(-1));
    let minus_two = Some(InstanceRegistrationId::new(-2));

    provider
        .set_secret_configuration(&sample_secret_configuration("shared"), None)
        .await
        .unwrap();
    provider
        .set_secret_configuration(&sample_secret_configuration("minus-one"), minus_one)
        .await
        .unwrap();
    provider
        .set_secret_configuration(&sample_secret_configuration("minus-two"), minus_two)
        .await
        .unwrap();

    assert_eq!(count_rows(&db, "secret_configurations").await, 3);

    let cold = provider_for(&db);
    assert_eq!(
        cold.get_secret_configuration(None).await.unwrap(),
        Some(sample_secret_configuration("shared"))
    );
    assert_eq!(
        cold.get_secret_configuration(minus_one).await.unwrap(),
        Some(sample_secret_configuration("minus-one"))
    );
    assert_eq!(
        cold.get_secret_configuration(minus_two).await.unwrap(),
        Some(sample_secret_configuration("minus-two"))
    );
}

#[tokio::test]
async fn test_sql_configuration_is_a_singleton() {
    let db = TestDatabase::new("sql_singleton").await;
    let store = SqlxConfigurationStore::new(db.pool.clone());

    store.upsert_sql_config_row("first").await.unwrap();
    store.upsert_sql_config_row("second").await.unwrap();

    assert_eq!(
        store.find_sql_config_row().await.unwrap().as_deref(),
        Some("second")
    );
    assert_eq!(count_rows(&db, "sql_configurations").await, 1);
}

#[tokio::test]
async fn test_concurrent_upserts_same_scope() {
    let db = TestDatabase::new("concurrent_upserts").await;
    let store = Arc::new(SqlxConfigurationStore::new(db.pool.clone()));

    let tasks: Vec<_> = (0..10)
        .map(|n| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .upsert_secret_config_row(None, &format!("v{}", n))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(count_rows(&db, "secret_configurations").await, 1);
}

#[tokio::test]
async fn test_provider_round_trip_and_sql_self_heal() {
    let db = TestDatabase::new("provider_round_trip").await;
    let plain = serde_json::to_string(&sample_sql_configuration()).unwrap();
    sqlx::query("INSERT INTO sql_configurations (id, configurations) VALUES (1, $1)")
        .bind(&plain)
        .execute(&db.pool)
        .await
        .unwrap();

    let provider = provider_for(&db);
    let scope = Some(InstanceRegistrationId::new(12));
    provider
        .set_secret_configuration(&sample_secret_configuration("pg"), scope)
        .await
        .unwrap();

    let cold = provider_for(&db);
    assert_eq!(
        cold.get_secret_configuration(scope).await.unwrap(),
        Some(sample_secret_configuration("pg"))
    );
    assert_eq!(
        cold.get_sql_configuration().await.unwrap(),
        Some(sample_sql_configuration())
    );

    let stored: String =
        sqlx::query_scalar("SELECT configurations FROM sql_configurations WHERE id = 1")
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_ne!(stored, plain);
    assert_eq!(
        provider_for(&db).get_sql_configuration().await.unwrap(),
        Some(sample_sql_configuration())
    );
}

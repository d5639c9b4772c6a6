//! Tests for SQLite database connection and migrations.

use crate::db::{Database, SqliteDatabase};

#[tokio::test(flavor = "multi_thread")]
async fn migrate_creates_all_tables() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");

    db.migrate().await.expect("Migration should succeed");

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Query should succeed");

    // _sqlx_migrations is created by sqlx for migration tracking.
    let expected = vec!["_sqlx_migrations", "organizations", "tasks", "tickets"];

    for table in &expected {
        assert!(
            tables.iter().any(|t| t == table),
            "Missing table: {}. Found tables: {:?}",
            table,
            tables
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn migrate_creates_scope_indexes() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");

    let indexes: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='index'")
            .fetch_all(db.pool())
            .await
            .expect("Query should succeed");

    assert!(indexes.iter().any(|i| i == "idx_tickets_organization_id"));
    assert!(indexes.iter().any(|i| i == "idx_tasks_user_id"));
}

#[tokio::test(flavor = "multi_thread")]
async fn migrate_is_idempotent() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");

    db.migrate().await.expect("First migration should succeed");
    db.migrate().await.expect("Second migration should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_keys_are_enforced() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(db.pool())
        .await
        .expect("Query should succeed");

    assert_eq!(enabled, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn open_creates_database_file() {
    let dir = std::env::temp_dir().join(format!("taskboard-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("taskboard.db");

    let db = SqliteDatabase::open(&path).await.expect("open should succeed");
    db.migrate().await.expect("Migration should succeed");

    assert!(path.exists());
    std::fs::remove_dir_all(&dir).ok();
}

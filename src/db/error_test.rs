//! Tests for database error types.

use crate::db::{DbError, DbResult};

#[test]
fn validation_error_displays_correctly() {
    let err = DbError::Validation {
        message: "title must not be empty".to_string(),
    };
    assert_eq!(err.to_string(), "Validation error: title must not be empty");
}

#[test]
fn constraint_error_displays_correctly() {
    let err = DbError::Constraint {
        message: "FOREIGN KEY constraint failed".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Constraint violation: FOREIGN KEY constraint failed"
    );
}

#[test]
fn migration_error_displays_correctly() {
    let err = DbError::Migration {
        message: "failed to apply migration 0002".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Migration error: failed to apply migration 0002"
    );
}

#[test]
fn pool_timeout_maps_to_connection_error() {
    let err = DbError::from(sqlx::Error::PoolTimedOut);
    assert!(matches!(err, DbError::Connection { .. }));
}

#[test]
fn row_not_found_maps_to_database_error() {
    let err = DbError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, DbError::Database { .. }));
}

#[test]
fn db_result_err_returns_error() {
    let result: DbResult<i32> = Err(DbError::Validation {
        message: "text must not be empty".to_string(),
    });
    assert!(result.is_err());
}

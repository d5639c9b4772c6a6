//! Database error types.
//!
//! Storage-backend agnostic errors for repository operations, using miette
//! for diagnostic codes and thiserror for the derives.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Validation error: {message}")]
    #[diagnostic(code(taskboard::db::validation_error))]
    Validation { message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(taskboard::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(taskboard::db::migration_error))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(taskboard::db::connection_error))]
    Connection { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(taskboard::db::constraint))]
    Constraint { message: String },
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db)
                if db.is_foreign_key_violation()
                    || db.is_unique_violation()
                    || db.is_check_violation() =>
            {
                DbError::Constraint {
                    message: db.message().to_string(),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DbError::Connection {
                    message: e.to_string(),
                }
            }
            _ => DbError::Database {
                message: e.to_string(),
            },
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

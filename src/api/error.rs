//! API error types.

use axum::Json;
use axum::http::StatusCode;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::db::DbError;

/// Server lifecycle failures.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(
        code(taskboard::api::bind),
        help("Is another process already listening on this port?")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(taskboard::api::serve))]
    Serve(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Ticket not found")]
    pub error: String,
}

/// What a failing handler returns.
pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// The one response for every authentication failure.
pub fn unauthorized() -> HandlerError {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}

pub fn not_found(entity: &str) -> HandlerError {
    error_response(StatusCode::NOT_FOUND, format!("{} not found", entity))
}

/// Map a storage error. Internal detail is logged, not returned.
pub fn db_error(e: DbError) -> HandlerError {
    match e {
        DbError::Validation { message } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, message)
        }
        other => {
            error!(error = %other, "storage failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

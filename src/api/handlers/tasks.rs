//! Task list handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::{ErrorResponse, HandlerError, db_error};
use crate::api::json::JsonBody;
use crate::auth::SessionVerifier;
use crate::db::{Database, Task};

// =============================================================================
// DTOs
// =============================================================================

/// A task as clients see it. The owner id is never echoed.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    /// Creation time in epoch milliseconds, as a string
    #[schema(example = "1718036400123")]
    pub id: String,
    /// Task text
    #[schema(example = "Buy milk")]
    pub text: String,
    /// Whether the task is done
    pub completed: bool,
    /// Creation timestamp
    #[schema(example = "2025-01-01T00:00:00.000Z")]
    pub created_at: String,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            text: t.text,
            completed: t.completed,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TasksResponse {
    /// Open tasks first, then completed ones
    pub tasks: Vec<TaskResponse>,
}

impl From<Vec<Task>> for TasksResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(TaskResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Task text (required, non-blank)
    #[serde(rename = "taskText")]
    #[schema(example = "Buy milk")]
    pub task_text: String,
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "The caller's tasks, incomplete first", body = TasksResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn list_tasks<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
) -> Result<Json<TasksResponse>, HandlerError> {
    let tasks = state
        .tasks()
        .list(&auth.owner_scope())
        .await
        .map_err(db_error)?;
    Ok(Json(tasks.into()))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task added; full list returned", body = TasksResponse),
        (status = 400, description = "Empty or malformed body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Missing or blank taskText", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn create_task<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> Result<Json<TasksResponse>, HandlerError> {
    let tasks = state
        .tasks()
        .add(&auth.owner_scope(), &req.task_text)
        .await
        .map_err(db_error)?;
    Ok(Json(tasks.into()))
}

#[utoipa::path(
    post,
    path = "/api/tasks/{id}/complete",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task completed; full list returned", body = TasksResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn complete_task<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<TasksResponse>, HandlerError> {
    let tasks = state
        .tasks()
        .mark_completed(&auth.owner_scope(), &id)
        .await
        .map_err(db_error)?;
    Ok(Json(tasks.into()))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted; full list returned", body = TasksResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_task<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<TasksResponse>, HandlerError> {
    let tasks = state
        .tasks()
        .delete(&auth.owner_scope(), &id)
        .await
        .map_err(db_error)?;
    Ok(Json(tasks.into()))
}

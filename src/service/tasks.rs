//! Personal task list operations, confined to one owner.

use std::sync::Arc;

use tracing::{debug, info};

use super::{IdClock, SystemClock};
use crate::auth::OwnerScope;
use crate::db::utils::current_timestamp;
use crate::db::{Database, DbError, DbResult, Task, TaskRepository};

/// Task operations. Every mutation answers with the owner's refreshed list.
pub struct TaskService<D: Database> {
    db: Arc<D>,
    clock: Arc<dyn IdClock>,
}

impl<D: Database> Clone for TaskService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<D: Database> TaskService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self::with_clock(db, SystemClock)
    }

    pub fn with_clock(db: Arc<D>, clock: impl IdClock) -> Self {
        Self {
            db,
            clock: Arc::new(clock),
        }
    }

    /// Incomplete tasks first, then by id.
    pub async fn list(&self, scope: &OwnerScope) -> DbResult<Vec<Task>> {
        self.db.tasks().list(scope.user_id()).await
    }

    pub async fn get(&self, scope: &OwnerScope, id: &str) -> DbResult<Option<Task>> {
        self.db.tasks().get(scope.user_id(), id).await
    }

    /// Add an incomplete task. The id is the current time in milliseconds.
    pub async fn add(&self, scope: &OwnerScope, text: &str) -> DbResult<Vec<Task>> {
        if text.trim().is_empty() {
            return Err(DbError::Validation {
                message: "task text must not be empty".to_string(),
            });
        }

        let task = Task {
            id: self.clock.now_millis().to_string(),
            user_id: scope.user_id().to_string(),
            text: text.to_string(),
            completed: false,
            created_at: current_timestamp(),
        };
        self.db.tasks().create(&task).await?;
        info!(task_id = %task.id, "task added");

        self.list(scope).await
    }

    /// Mark an owned task completed. Ids the caller does not own are ignored.
    pub async fn mark_completed(&self, scope: &OwnerScope, id: &str) -> DbResult<Vec<Task>> {
        if !self.db.tasks().mark_completed(scope.user_id(), id).await? {
            debug!(task_id = id, "complete target not in scope");
        }
        self.list(scope).await
    }

    /// Delete an owned task. Ids the caller does not own are ignored.
    pub async fn delete(&self, scope: &OwnerScope, id: &str) -> DbResult<Vec<Task>> {
        if !self.db.tasks().delete(scope.user_id(), id).await? {
            debug!(task_id = id, "delete target not in scope");
        }
        self.list(scope).await
    }
}

//! SQLite TaskRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::{DbResult, Task, TaskRepository};

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &Task) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, user_id, text, completed, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.id)
        .bind(&task.user_id)
        .bind(&task.text)
        .bind(task.completed)
        .bind(&task.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: &str, id: &str) -> DbResult<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, user_id, text, completed, created_at FROM tasks WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_task))
    }

    async fn list(&self, user_id: &str) -> DbResult<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT id, user_id, text, completed, created_at FROM tasks
             WHERE user_id = ?
             ORDER BY completed ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(row_to_task).collect())
    }

    async fn mark_completed(&self, user_id: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE tasks SET completed = 1 WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a Task model.
fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Task {
    Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        text: row.get("text"),
        completed: row.get::<bool, _>("completed"),
        created_at: row.get("created_at"),
    }
}

//! SQLite OrganizationRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::current_timestamp;
use crate::db::{DbResult, Organization, OrganizationRepository};

/// SQLx-backed organization repository.
pub struct SqliteOrganizationRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository for SqliteOrganizationRepository<'a> {
    async fn get(&self, id: &str) -> DbResult<Option<Organization>> {
        let row = sqlx::query(
            "SELECT id, name, created_at, updated_at FROM organizations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_organization))
    }

    async fn get_or_create(&self, id: &str, name: &str) -> DbResult<Organization> {
        let now = current_timestamp();

        // A concurrent first request for the same tenant may race us here;
        // the conflict clause makes the loser a no-op.
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, name, created_at, updated_at FROM organizations WHERE id = ?",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(row_to_organization(&row))
    }

    async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to an Organization model.
fn row_to_organization(row: &sqlx::sqlite::SqliteRow) -> Organization {
    Organization {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

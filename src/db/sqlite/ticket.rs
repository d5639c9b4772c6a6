//! SQLite TicketRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{DbResult, NewTicket, Ticket, TicketRepository, TicketSearch, TicketStatus};

const TICKET_COLUMNS: &str =
    "id, title, assignee, status, description, organization_id, created_at, updated_at";

/// SQLx-backed ticket repository.
pub struct SqliteTicketRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TicketRepository for SqliteTicketRepository<'a> {
    async fn create(&self, org_id: &str, ticket: &NewTicket) -> DbResult<Ticket> {
        let id = generate_entity_id();
        let now = current_timestamp();
        let status = TicketStatus::default();

        sqlx::query(
            r#"
            INSERT INTO tickets (id, title, assignee, status, description, organization_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&ticket.title)
        .bind(&ticket.assignee)
        .bind(status.as_str())
        .bind(&ticket.description)
        .bind(org_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(Ticket {
            id,
            title: ticket.title.clone(),
            assignee: ticket.assignee.clone(),
            status,
            description: ticket.description.clone(),
            organization_id: org_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn get(&self, org_id: &str, id: &str) -> DbResult<Option<Ticket>> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE id = ? AND organization_id = ?",
            TICKET_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(org_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_ticket))
    }

    async fn list(&self, org_id: &str) -> DbResult<Vec<Ticket>> {
        let sql = format!(
            "SELECT {} FROM tickets WHERE organization_id = ? ORDER BY rowid ASC",
            TICKET_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(org_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.iter().map(row_to_ticket).collect())
    }

    async fn search(&self, org_id: &str, search: &TicketSearch) -> DbResult<Vec<Ticket>> {
        // Scope predicate always comes first; filters only narrow it.
        let mut conditions: Vec<&str> = vec!["organization_id = ?"];
        let mut bind_values: Vec<String> = vec![org_id.to_string()];

        if let Some(status) = &search.status {
            conditions.push("status = ?");
            bind_values.push(status.as_str().to_string());
        }

        if let Some(assignee) = &search.assignee {
            conditions.push("LOWER(assignee) = ?");
            bind_values.push(assignee.to_lowercase());
        }

        if let Some(fragment) = &search.title_contains {
            conditions.push("instr(LOWER(title), ?) > 0");
            bind_values.push(fragment.to_lowercase());
        }

        let sql = format!(
            "SELECT {} FROM tickets WHERE {} ORDER BY rowid ASC",
            TICKET_COLUMNS,
            conditions.join(" AND ")
        );

        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }

        let rows = query_builder.fetch_all(self.pool).await?;

        Ok(rows.iter().map(row_to_ticket).collect())
    }

    async fn update(&self, org_id: &str, ticket: &Ticket) -> DbResult<Option<Ticket>> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET title = ?, assignee = ?, status = ?, description = ?, updated_at = ?
            WHERE id = ? AND organization_id = ?
            "#,
        )
        .bind(&ticket.title)
        .bind(&ticket.assignee)
        .bind(ticket.status.as_str())
        .bind(&ticket.description)
        .bind(current_timestamp())
        .bind(&ticket.id)
        .bind(org_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(org_id, &ticket.id).await
    }

    async fn delete(&self, org_id: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = ? AND organization_id = ?")
            .bind(id)
            .bind(org_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a Ticket model.
fn row_to_ticket(row: &sqlx::sqlite::SqliteRow) -> Ticket {
    Ticket {
        id: row.get("id"),
        title: row.get("title"),
        assignee: row.get("assignee"),
        status: {
            let status_str: String = row.get("status");
            TicketStatus::from_str(&status_str).unwrap_or_default()
        },
        description: row.get("description"),
        organization_id: row.get("organization_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

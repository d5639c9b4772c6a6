//! Ticket board operations, confined to one organization.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::OrgScope;
use crate::db::{
    Database, DbError, DbResult, NewTicket, Organization, OrganizationRepository, Ticket,
    TicketPatch, TicketRepository, TicketSearch, TicketStatus,
};

/// Name given to an organization row created on first access.
pub const DEFAULT_ORGANIZATION_NAME: &str = "Default Organization";

/// Ticket counts for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TicketStatistics {
    pub total_tickets: usize,
    /// Count per status; statuses with no tickets are omitted.
    pub status_distribution: BTreeMap<String, usize>,
    pub assignee_distribution: BTreeMap<String, usize>,
    pub organization_id: String,
}

pub struct TicketService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for TicketService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> TicketService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Return the caller's organization row, creating it if absent.
    pub async fn get_or_create_organization(
        &self,
        scope: &OrgScope,
        default_name: &str,
    ) -> DbResult<Organization> {
        self.db
            .organizations()
            .get_or_create(scope.organization_id(), default_name)
            .await
    }

    /// The caller's organization, if a row exists for it.
    pub async fn organization(&self, scope: &OrgScope) -> DbResult<Option<Organization>> {
        self.db.organizations().get(scope.organization_id()).await
    }

    pub async fn list(&self, scope: &OrgScope) -> DbResult<Vec<Ticket>> {
        self.db.tickets().list(scope.organization_id()).await
    }

    pub async fn get(&self, scope: &OrgScope, id: &str) -> DbResult<Option<Ticket>> {
        self.db.tickets().get(scope.organization_id(), id).await
    }

    pub async fn search(&self, scope: &OrgScope, search: &TicketSearch) -> DbResult<Vec<Ticket>> {
        self.db.tickets().search(scope.organization_id(), search).await
    }

    /// Create a ticket in `backlog`. Title and assignee must be non-empty.
    pub async fn create(&self, scope: &OrgScope, ticket: NewTicket) -> DbResult<Ticket> {
        require_non_empty("title", &ticket.title)?;
        require_non_empty("assignee", &ticket.assignee)?;

        let created = self
            .db
            .tickets()
            .create(scope.organization_id(), &ticket)
            .await?;

        info!(
            ticket_id = %created.id,
            organization_id = %created.organization_id,
            "ticket created"
        );
        Ok(created)
    }

    pub async fn update_status(
        &self,
        scope: &OrgScope,
        id: &str,
        status: TicketStatus,
    ) -> DbResult<Option<Ticket>> {
        self.update(
            scope,
            id,
            TicketPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply the fields present in `patch`. `None` when the ticket is not in scope.
    pub async fn update(
        &self,
        scope: &OrgScope,
        id: &str,
        patch: TicketPatch,
    ) -> DbResult<Option<Ticket>> {
        if let Some(title) = &patch.title {
            require_non_empty("title", title)?;
        }
        if let Some(assignee) = &patch.assignee {
            require_non_empty("assignee", assignee)?;
        }

        let tickets = self.db.tickets();
        let Some(mut ticket) = tickets.get(scope.organization_id(), id).await? else {
            debug!(ticket_id = id, "update target not in scope");
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(ticket));
        }

        patch.apply_to(&mut ticket);
        tickets.update(scope.organization_id(), &ticket).await
    }

    /// Remove a ticket. `false` when nothing in scope matched.
    pub async fn delete(&self, scope: &OrgScope, id: &str) -> DbResult<bool> {
        let deleted = self.db.tickets().delete(scope.organization_id(), id).await?;
        if deleted {
            info!(ticket_id = id, "ticket deleted");
        }
        Ok(deleted)
    }

    pub async fn statistics(&self, scope: &OrgScope) -> DbResult<TicketStatistics> {
        let tickets = self.list(scope).await?;

        let mut status_distribution = BTreeMap::new();
        let mut assignee_distribution = BTreeMap::new();
        for ticket in &tickets {
            *status_distribution
                .entry(ticket.status.to_string())
                .or_insert(0) += 1;
            *assignee_distribution
                .entry(ticket.assignee.clone())
                .or_insert(0) += 1;
        }

        Ok(TicketStatistics {
            total_tickets: tickets.len(),
            status_distribution,
            assignee_distribution,
            organization_id: scope.organization_id().to_string(),
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::Validation {
            message: format!("{} must not be empty", field),
        });
    }
    Ok(())
}

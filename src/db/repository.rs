//! Repository traits for data access abstraction.
//!
//! Every ticket and task operation takes the owning scope (organization id or
//! user id) and filters on it. There is no unscoped read or write path for
//! either entity.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{NewTicket, Organization, Task, Ticket, TicketSearch},
};

/// Repository for Organization operations.
pub trait OrganizationRepository: Send + Sync {
    /// Get an organization by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<Option<Organization>>> + Send;

    /// Insert an organization with the given ID unless one already exists,
    /// then return the stored row.
    fn get_or_create(
        &self,
        id: &str,
        name: &str,
    ) -> impl Future<Output = DbResult<Organization>> + Send;

    /// Delete an organization and, by cascade, its tickets.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Repository for Ticket operations, scoped by organization.
pub trait TicketRepository: Send + Sync {
    /// Create a ticket in the organization. Status starts at backlog.
    fn create(
        &self,
        org_id: &str,
        ticket: &NewTicket,
    ) -> impl Future<Output = DbResult<Ticket>> + Send;

    /// Get a ticket by ID within the organization.
    fn get(&self, org_id: &str, id: &str) -> impl Future<Output = DbResult<Option<Ticket>>> + Send;

    /// Get all tickets of the organization in insertion order.
    fn list(&self, org_id: &str) -> impl Future<Output = DbResult<Vec<Ticket>>> + Send;

    /// Filter the organization's tickets.
    fn search(
        &self,
        org_id: &str,
        search: &TicketSearch,
    ) -> impl Future<Output = DbResult<Vec<Ticket>>> + Send;

    /// Persist all mutable fields of a ticket and bump `updated_at`.
    /// Returns the stored row, or `None` if no such ticket exists in the organization.
    fn update(
        &self,
        org_id: &str,
        ticket: &Ticket,
    ) -> impl Future<Output = DbResult<Option<Ticket>>> + Send;

    /// Delete a ticket. Returns whether a row was removed.
    fn delete(&self, org_id: &str, id: &str) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Repository for Task operations, scoped by owner.
pub trait TaskRepository: Send + Sync {
    /// Insert a task.
    fn create(&self, task: &Task) -> impl Future<Output = DbResult<()>> + Send;

    /// Get a task by ID for the owner.
    fn get(&self, user_id: &str, id: &str) -> impl Future<Output = DbResult<Option<Task>>> + Send;

    /// Get the owner's tasks, incomplete first, then by ID ascending.
    fn list(&self, user_id: &str) -> impl Future<Output = DbResult<Vec<Task>>> + Send;

    /// Mark an owned task completed. Returns whether a row matched.
    fn mark_completed(
        &self,
        user_id: &str,
        id: &str,
    ) -> impl Future<Output = DbResult<bool>> + Send;

    /// Delete an owned task. Returns whether a row was removed.
    fn delete(&self, user_id: &str, id: &str) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Combined database interface.
pub trait Database: Send + Sync + 'static {
    type Organizations<'a>: OrganizationRepository
    where
        Self: 'a;
    type Tickets<'a>: TicketRepository
    where
        Self: 'a;
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the organization repository.
    fn organizations(&self) -> Self::Organizations<'_>;

    /// Get the ticket repository.
    fn tickets(&self) -> Self::Tickets<'_>;

    /// Get the task repository.
    fn tasks(&self) -> Self::Tasks<'_>;
}

//! Ticket board handlers.
//!
//! Mutations answer with the organization's full ticket list.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::api::auth::Authenticated;
use crate::api::error::{ErrorResponse, HandlerError, db_error, error_response, not_found};
use crate::api::json::JsonBody;
use crate::auth::{OrgScope, SessionVerifier};
use crate::db::{
    Database, NewTicket, Ticket, TicketPatch, TicketSearch, TicketStatus, filter_value,
};
use crate::service::{DEFAULT_ORGANIZATION_NAME, TicketService, TicketStatistics};

// =============================================================================
// DTOs
// =============================================================================

/// Ticket response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct TicketResponse {
    /// Unique identifier (UUID)
    #[schema(example = "6f1c2a9e-3b7d-4e0f-9a51-0c2d8e7b4f11")]
    pub id: String,
    /// Ticket title
    #[schema(example = "Fix login redirect")]
    pub title: String,
    /// Person the ticket is assigned to
    #[schema(example = "bob")]
    pub assignee: String,
    /// Board column: backlog, in-progress, review or done
    #[schema(example = "backlog")]
    pub status: String,
    /// Optional description
    #[schema(example = "Users land on /home instead of the page they asked for")]
    pub description: Option<String>,
    /// Owning organization
    #[schema(example = "organization-test-07971b06")]
    pub organization_id: String,
    /// Creation timestamp
    #[schema(example = "2025-01-01T00:00:00.000Z")]
    pub created_at: String,
    /// Last update timestamp
    #[schema(example = "2025-01-01T00:00:00.000Z")]
    pub updated_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            assignee: t.assignee,
            status: t.status.to_string(),
            description: t.description,
            organization_id: t.organization_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketsResponse {
    /// The organization's tickets, oldest first
    pub tickets: Vec<TicketResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    /// Ticket title (required, non-blank)
    #[schema(example = "Fix login redirect")]
    pub title: String,
    /// Assignee (required, non-blank)
    #[schema(example = "bob")]
    pub assignee: String,
    /// Optional description
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status
    #[schema(example = "in-progress")]
    pub status: String,
}

/// Partial ticket update. Omitted fields are left as they are;
/// `"description": null` clears the description.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchTicketRequest {
    /// New title
    pub title: Option<String>,
    /// New assignee
    pub assignee: Option<String>,
    /// New status
    #[schema(example = "review")]
    pub status: Option<String>,
    /// New description, or null to clear it
    #[serde(default, deserialize_with = "crate::serde_utils::nullable")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchTicketsQuery {
    /// Exact status (backlog, in-progress, review, done)
    #[param(example = "backlog")]
    pub status: Option<String>,
    /// Assignee, compared case-insensitively
    #[param(example = "alice")]
    pub assignee: Option<String>,
    /// Case-insensitive fragment of the title
    #[param(example = "login")]
    pub title_contains: Option<String>,
}

fn parse_status(value: &str) -> Result<TicketStatus, HandlerError> {
    value.parse().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "Invalid status. Must be one of: backlog, in-progress, review, done",
        )
    })
}

async fn all_tickets<D: Database>(
    service: &TicketService<D>,
    scope: &OrgScope,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let tickets = service.list(scope).await.map_err(db_error)?;
    Ok(Json(TicketsResponse {
        tickets: tickets.into_iter().map(TicketResponse::from).collect(),
    }))
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "tickets",
    responses(
        (status = 200, description = "All tickets of the caller's organization", body = TicketsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn list_tickets<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    let service = state.tickets();

    service
        .get_or_create_organization(&scope, DEFAULT_ORGANIZATION_NAME)
        .await
        .map_err(db_error)?;

    all_tickets(service, &scope).await
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 200, description = "Ticket created; full list returned", body = TicketsResponse),
        (status = 400, description = "Empty or malformed body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 422, description = "Body does not match the schema", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn create_ticket<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    JsonBody(req): JsonBody<CreateTicketRequest>,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    let service = state.tickets();

    service
        .get_or_create_organization(&scope, DEFAULT_ORGANIZATION_NAME)
        .await
        .map_err(db_error)?;

    service
        .create(
            &scope,
            NewTicket {
                title: req.title,
                assignee: req.assignee,
                description: req.description,
            },
        )
        .await
        .map_err(db_error)?;

    all_tickets(service, &scope).await
}

#[utoipa::path(
    get,
    path = "/api/tickets/search",
    tag = "tickets",
    params(SearchTicketsQuery),
    responses(
        (status = 200, description = "Matching tickets", body = TicketsResponse),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn search_tickets<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Query(query): Query<SearchTicketsQuery>,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;

    let search = TicketSearch::new(
        filter_value(query.status)
            .as_deref()
            .map(parse_status)
            .transpose()?,
        query.assignee,
        query.title_contains,
    );

    let tickets = state
        .tickets()
        .search(&scope, &search)
        .await
        .map_err(db_error)?;

    Ok(Json(TicketsResponse {
        tickets: tickets.into_iter().map(TicketResponse::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/tickets/statistics",
    tag = "tickets",
    responses(
        (status = 200, description = "Ticket counts for the organization", body = TicketStatistics),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn ticket_statistics<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
) -> Result<Json<TicketStatistics>, HandlerError> {
    let scope = auth.org_scope()?;
    let stats = state
        .tickets()
        .statistics(&scope)
        .await
        .map_err(db_error)?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket found", body = TicketResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_ticket<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    match state.tickets().get(&scope, &id).await.map_err(db_error)? {
        Some(ticket) => Ok(Json(ticket.into())),
        None => Err(not_found("Ticket")),
    }
}

#[utoipa::path(
    post,
    path = "/api/tickets/{id}/status",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated; full list returned", body = TicketsResponse),
        (status = 400, description = "Invalid status or body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn update_ticket_status<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    let status = parse_status(&req.status)?;
    let service = state.tickets();

    service
        .update_status(&scope, &id, status)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Ticket"))?;

    all_tickets(service, &scope).await
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{id}",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = PatchTicketRequest,
    responses(
        (status = 200, description = "Ticket updated; full list returned", body = TicketsResponse),
        (status = 400, description = "Invalid status or body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 422, description = "Body does not match the schema", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn patch_ticket<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<PatchTicketRequest>,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    let patch = TicketPatch {
        title: req.title,
        assignee: req.assignee,
        status: req.status.as_deref().map(parse_status).transpose()?,
        description: req.description,
    };
    let service = state.tickets();

    service
        .update(&scope, &id, patch)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found("Ticket"))?;

    all_tickets(service, &scope).await
}

#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket deleted; full list returned", body = TicketsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_ticket<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<TicketsResponse>, HandlerError> {
    let scope = auth.org_scope()?;
    let service = state.tickets();

    if !service.delete(&scope, &id).await.map_err(db_error)? {
        return Err(not_found("Ticket"));
    }

    all_tickets(service, &scope).await
}

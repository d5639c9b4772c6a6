//! Ticket board tools.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::json;

use super::gate::{org_scope, principal_from};
use super::{json_contents, json_resource, json_result, map_db_error};
use crate::api::TicketResponse;
use crate::auth::OrgScope;
use crate::db::{Database, NewTicket, TicketPatch, TicketSearch, TicketStatus, filter_value};
use crate::service::{DEFAULT_ORGANIZATION_NAME, TicketService, TicketStatistics};

/// URI of the caller's ticket list resource.
pub const TICKETS_RESOURCE: &str = "tickets://authenticated";

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TicketIdParams {
    #[schemars(description = "Ticket ID")]
    pub ticket_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTicketParams {
    #[schemars(description = "Short summary of the work")]
    pub title: String,
    #[schemars(description = "Person responsible for the ticket")]
    pub assignee: String,
    #[schemars(description = "Longer description (optional)")]
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateStatusParams {
    #[schemars(description = "Ticket ID")]
    pub ticket_id: String,
    #[schemars(description = "New status: 'backlog', 'in-progress', 'review' or 'done'")]
    pub status: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTicketParams {
    #[schemars(description = "Ticket ID")]
    pub ticket_id: String,
    #[schemars(description = "New title (optional)")]
    #[serde(default)]
    pub title: Option<String>,
    #[schemars(description = "New assignee (optional)")]
    #[serde(default)]
    pub assignee: Option<String>,
    #[schemars(description = "New status (optional): 'backlog', 'in-progress', 'review', 'done'")]
    #[serde(default)]
    pub status: Option<String>,
    #[schemars(description = "New description (optional). Null clears it.")]
    #[serde(default, deserialize_with = "crate::serde_utils::nullable")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SearchTicketsParams {
    #[schemars(description = "Exact status to match (optional)")]
    #[serde(default)]
    pub status: Option<String>,
    #[schemars(description = "Assignee, case-insensitive (optional)")]
    #[serde(default)]
    pub assignee: Option<String>,
    #[schemars(description = "Case-insensitive title fragment (optional)")]
    #[serde(default)]
    pub title_contains: Option<String>,
}

fn parse_status(value: &str) -> Result<TicketStatus, McpError> {
    value
        .parse()
        .map_err(|e: String| McpError::invalid_params(e, Some(json!({ "status": value }))))
}

// =============================================================================
// Ticket Server
// =============================================================================

/// MCP server for the ticket board. All operations are confined to the
/// caller's organization.
pub struct TicketMcpServer<D: Database> {
    tickets: TicketService<D>,
    tool_router: ToolRouter<Self>,
}

impl<D: Database> Clone for TicketMcpServer<D> {
    fn clone(&self) -> Self {
        Self::new(self.tickets.clone())
    }
}

impl<D: Database> TicketMcpServer<D> {
    pub async fn list(&self, scope: &OrgScope) -> Result<Vec<TicketResponse>, McpError> {
        let tickets = self.tickets.list(scope).await.map_err(map_db_error)?;
        Ok(tickets.into_iter().map(TicketResponse::from).collect())
    }

    pub async fn get(
        &self,
        scope: &OrgScope,
        ticket_id: &str,
    ) -> Result<Option<TicketResponse>, McpError> {
        let ticket = self
            .tickets
            .get(scope, ticket_id)
            .await
            .map_err(map_db_error)?;
        Ok(ticket.map(TicketResponse::from))
    }

    pub async fn create(
        &self,
        scope: &OrgScope,
        params: CreateTicketParams,
    ) -> Result<TicketResponse, McpError> {
        self.tickets
            .get_or_create_organization(scope, DEFAULT_ORGANIZATION_NAME)
            .await
            .map_err(map_db_error)?;

        let ticket = self
            .tickets
            .create(
                scope,
                NewTicket {
                    title: params.title,
                    assignee: params.assignee,
                    description: params.description,
                },
            )
            .await
            .map_err(map_db_error)?;
        Ok(ticket.into())
    }

    pub async fn set_status(
        &self,
        scope: &OrgScope,
        params: UpdateStatusParams,
    ) -> Result<Option<TicketResponse>, McpError> {
        let status = parse_status(&params.status)?;
        let ticket = self
            .tickets
            .update_status(scope, &params.ticket_id, status)
            .await
            .map_err(map_db_error)?;
        Ok(ticket.map(TicketResponse::from))
    }

    pub async fn patch(
        &self,
        scope: &OrgScope,
        params: UpdateTicketParams,
    ) -> Result<Option<TicketResponse>, McpError> {
        let patch = TicketPatch {
            title: params.title,
            assignee: params.assignee,
            status: params.status.as_deref().map(parse_status).transpose()?,
            description: params.description,
        };
        let ticket = self
            .tickets
            .update(scope, &params.ticket_id, patch)
            .await
            .map_err(map_db_error)?;
        Ok(ticket.map(TicketResponse::from))
    }

    pub async fn remove(&self, scope: &OrgScope, ticket_id: &str) -> Result<bool, McpError> {
        self.tickets
            .delete(scope, ticket_id)
            .await
            .map_err(map_db_error)
    }

    /// Name of the caller's organization, if it has a row yet.
    pub async fn organization_name(&self, scope: &OrgScope) -> Result<Option<String>, McpError> {
        let org = self
            .tickets
            .organization(scope)
            .await
            .map_err(map_db_error)?;
        Ok(org.map(|o| o.name))
    }

    pub async fn search(
        &self,
        scope: &OrgScope,
        params: SearchTicketsParams,
    ) -> Result<Vec<TicketResponse>, McpError> {
        let search = TicketSearch::new(
            filter_value(params.status)
                .as_deref()
                .map(parse_status)
                .transpose()?,
            params.assignee,
            params.title_contains,
        );
        let tickets = self
            .tickets
            .search(scope, &search)
            .await
            .map_err(map_db_error)?;
        Ok(tickets.into_iter().map(TicketResponse::from).collect())
    }

    pub async fn statistics(&self, scope: &OrgScope) -> Result<TicketStatistics, McpError> {
        self.tickets.statistics(scope).await.map_err(map_db_error)
    }
}

#[tool_router(vis = "pub(crate)")]
impl<D: Database> TicketMcpServer<D> {
    pub fn new(tickets: TicketService<D>) -> Self {
        Self {
            tickets,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all tickets for the authenticated organization.")]
    pub async fn list_tickets(
        &self,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.list(&scope).await?)
    }

    #[tool(description = "Get a ticket by ID. Returns null if the organization has no such ticket.")]
    pub async fn get_ticket(
        &self,
        Parameters(params): Parameters<TicketIdParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.get(&scope, &params.ticket_id).await?)
    }

    #[tool(description = "Create a ticket in the backlog. Title and assignee are required.")]
    pub async fn create_ticket(
        &self,
        Parameters(params): Parameters<CreateTicketParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.create(&scope, params).await?)
    }

    #[tool(
        description = "Move a ticket to another status: 'backlog', 'in-progress', 'review' or 'done'. Returns null if the ticket does not exist."
    )]
    pub async fn update_ticket_status(
        &self,
        Parameters(params): Parameters<UpdateStatusParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.set_status(&scope, params).await?)
    }

    #[tool(
        description = "Update any of a ticket's title, assignee, status or description. Omitted fields are unchanged. Returns null if the ticket does not exist."
    )]
    pub async fn update_ticket(
        &self,
        Parameters(params): Parameters<UpdateTicketParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.patch(&scope, params).await?)
    }

    #[tool(description = "Delete a ticket. Returns whether a ticket was deleted.")]
    pub async fn delete_ticket(
        &self,
        Parameters(params): Parameters<TicketIdParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.remove(&scope, &params.ticket_id).await?)
    }

    #[tool(description = "Get the name of the authenticated organization, or null.")]
    pub async fn get_organization(
        &self,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.organization_name(&scope).await?)
    }

    #[tool(
        description = "Search tickets by exact status, case-insensitive assignee and/or case-insensitive title fragment. Filters are combined."
    )]
    pub async fn search_tickets(
        &self,
        Parameters(params): Parameters<SearchTicketsParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.search(&scope, params).await?)
    }

    #[tool(description = "Count the organization's tickets by status and by assignee.")]
    pub async fn get_ticket_statistics(
        &self,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = org_scope(&principal_from(&ctx)?)?;
        json_result(&self.statistics(&scope).await?)
    }
}

#[tool_handler]
impl<D: Database> ServerHandler for TicketMcpServer<D> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: Some(
                "Ticket Board - list, create, update, search and delete your organization's tickets."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![json_resource(TICKETS_RESOURCE, "tickets")],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        if uri != TICKETS_RESOURCE {
            return Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ));
        }

        let scope = org_scope(&principal_from(&ctx)?)?;
        let tickets = self.list(&scope).await?;
        let text = serde_json::to_string_pretty(&tickets)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(ReadResourceResult {
            contents: vec![json_contents(text, uri)],
        })
    }
}

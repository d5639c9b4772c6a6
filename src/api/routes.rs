//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, patch, post};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::config::{MissingSetting, Variant};
use super::error::ErrorResponse;
use super::handlers::{
    self, AuthorizationServerMetadata, CreateTaskRequest, CreateTicketRequest, HealthResponse,
    HealthcheckResponse, MessageResponse, PatchTicketRequest, ProtectedResourceMetadata,
    TaskResponse, TasksResponse, TicketResponse, TicketsResponse, UpdateStatusRequest,
};
use super::state::AppState;
use crate::auth::SessionVerifier;
use crate::db::Database;
use crate::mcp::mcp_router;
use crate::service::TicketStatistics;

/// Build routes for handlers generic over the database and verifier.
///
/// Applies the turbofish to every handler so route tables stay one line
/// per endpoint.
macro_rules! routes {
    ($D:ty, $V:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D, $V>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskboard API",
        version = "0.1.0",
        description = "Organization ticket board and personal task list",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::root,
        handlers::health,
        handlers::healthcheck,
        handlers::protected_resource,
        handlers::authorization_server,
        handlers::list_tickets,
        handlers::create_ticket,
        handlers::search_tickets,
        handlers::ticket_statistics,
        handlers::get_ticket,
        handlers::update_ticket_status,
        handlers::patch_ticket,
        handlers::delete_ticket,
        handlers::list_tasks,
        handlers::create_task,
        handlers::complete_task,
        handlers::delete_task,
    ),
    components(
        schemas(
            MessageResponse,
            HealthResponse,
            HealthcheckResponse,
            MissingSetting,
            ProtectedResourceMetadata,
            AuthorizationServerMetadata,
            TicketResponse,
            TicketsResponse,
            CreateTicketRequest,
            UpdateStatusRequest,
            PatchTicketRequest,
            TicketStatistics,
            TaskResponse,
            TasksResponse,
            CreateTaskRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "oauth", description = "OAuth discovery metadata"),
        (name = "tickets", description = "Organization ticket board"),
        (name = "tasks", description = "Personal task list")
    )
)]
pub struct ApiDoc;

/// Create the router for the configured variant: REST, discovery metadata,
/// docs and the MCP endpoint.
pub fn create_router<D: Database, V: SessionVerifier>(
    state: AppState<D, V>,
    cancellation_token: CancellationToken,
) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = routes!(D, V => {
        get "/" => handlers::root,
        get "/api/healthcheck" => handlers::healthcheck,
        get "/.well-known/oauth-protected-resource" => handlers::protected_resource,
        get "/.well-known/oauth-protected-resource/{*resource}" => handlers::protected_resource,
        get "/.well-known/oauth-authorization-server" => handlers::authorization_server,
    })
    .route("/health", get(handlers::health));

    let variant_routes = match state.config().variant {
        Variant::Tickets => routes!(D, V => {
            get "/api/tickets" => handlers::list_tickets,
            post "/api/tickets" => handlers::create_ticket,
            get "/api/tickets/search" => handlers::search_tickets,
            get "/api/tickets/statistics" => handlers::ticket_statistics,
            get "/api/tickets/{id}" => handlers::get_ticket,
            patch "/api/tickets/{id}" => handlers::patch_ticket,
            delete "/api/tickets/{id}" => handlers::delete_ticket,
            post "/api/tickets/{id}/status" => handlers::update_ticket_status,
        }),
        Variant::Tasks => routes!(D, V => {
            get "/api/tasks" => handlers::list_tasks,
            post "/api/tasks" => handlers::create_task,
            delete "/api/tasks/{id}" => handlers::delete_task,
            post "/api/tasks/{id}/complete" => handlers::complete_task,
        }),
    };

    let mcp = mcp_router(state.clone(), cancellation_token);

    system_routes
        .merge(variant_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
        .merge(mcp)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

//! MCP Streamable HTTP service creation.

use std::sync::Arc;

use axum::{Router, middleware};
use rmcp::{
    ServerHandler,
    transport::streamable_http_server::{
        SessionManager, StreamableHttpServerConfig, StreamableHttpService,
        session::local::LocalSessionManager,
    },
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{TaskMcpServer, TicketMcpServer, require_bearer};
use crate::api::{AppState, Variant};
use crate::auth::SessionVerifier;
use crate::db::Database;
use crate::service::{TaskService, TicketService};

/// Wrap a server factory in a Streamable HTTP service. `factory` runs once
/// per MCP session.
///
/// # Example
/// ```no_run
/// use axum::Router;
/// use tokio_util::sync::CancellationToken;
/// # use std::sync::Arc;
/// # use taskboard::db::{Database, SqliteDatabase};
/// # use taskboard::mcp::ticket_mcp_service;
/// # use taskboard::service::TicketService;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = SqliteDatabase::in_memory().await?;
/// db.migrate().await?;
///
/// let ct = CancellationToken::new();
/// let service = ticket_mcp_service(TicketService::new(Arc::new(db)), ct);
///
/// let app: Router = Router::new().nest_service("/mcp", service);
/// # Ok(())
/// # }
/// ```
pub fn create_mcp_service<S, F>(
    factory: F,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<S>
where
    S: ServerHandler + Send + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    let config = StreamableHttpServerConfig {
        sse_keep_alive: None,
        stateful_mode: true,
    };

    let sessions = Arc::new(LocalSessionManager::default());
    close_sessions_on_cancel(sessions.clone(), cancellation_token);

    // rmcp expects a fallible factory
    StreamableHttpService::new(
        move || -> Result<S, std::io::Error> { Ok(factory()) },
        sessions,
        config,
    )
}

/// Close every open MCP session once `cancellation_token` fires.
pub(crate) fn close_sessions_on_cancel(
    sessions: Arc<LocalSessionManager>,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        cancellation_token.cancelled().await;

        let ids: Vec<_> = sessions.sessions.read().await.keys().cloned().collect();
        info!(count = ids.len(), "closing MCP sessions");
        for id in ids {
            if let Err(e) = sessions.close_session(&id).await {
                debug!(session = %id, error = %e, "session already gone");
            }
        }
    })
}

pub fn ticket_mcp_service<D: Database>(
    tickets: TicketService<D>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<TicketMcpServer<D>> {
    create_mcp_service(
        move || TicketMcpServer::new(tickets.clone()),
        cancellation_token,
    )
}

pub fn task_mcp_service<D: Database>(
    tasks: TaskService<D>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<TaskMcpServer<D>> {
    create_mcp_service(move || TaskMcpServer::new(tasks.clone()), cancellation_token)
}

/// `/mcp` for the configured variant, behind the bearer gate.
pub fn mcp_router<D: Database, V: SessionVerifier>(
    state: AppState<D, V>,
    cancellation_token: CancellationToken,
) -> Router {
    let router = match state.config().variant {
        Variant::Tickets => Router::new().nest_service(
            "/mcp",
            ticket_mcp_service(state.tickets().clone(), cancellation_token),
        ),
        Variant::Tasks => Router::new().nest_service(
            "/mcp",
            task_mcp_service(state.tasks().clone(), cancellation_token),
        ),
    };

    // route_layer keeps the gate off the fallback so unknown paths stay 404
    router.route_layer(middleware::from_fn_with_state(state, require_bearer::<D, V>))
}

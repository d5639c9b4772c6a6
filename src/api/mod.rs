//! REST surface and server lifecycle.

mod auth;
mod config;
mod error;
mod handlers;
mod json;
mod routes;
mod state;


use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::SessionVerifier;
use crate::db::Database;

pub use auth::Authenticated;
pub use config::{Config, MissingSetting, Variant};
pub use error::{ApiError, ErrorResponse, HandlerError};
pub use handlers::{TaskResponse, TasksResponse, TicketResponse, TicketsResponse, base_url};
pub use routes::{ApiDoc, create_router};
pub use state::AppState;

/// Initialize tracing subscriber with env filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Serve until Ctrl-C or SIGTERM, then cancel open MCP sessions and drain.
pub async fn run<D: Database, V: SessionVerifier>(
    config: Config,
    db: D,
    verifier: V,
) -> Result<(), ApiError> {
    let addr = format!("{}:{}", config.host, config.port);
    let variant = config.variant;

    for missing in config.missing_settings() {
        error!(variable = %missing.variable, "{}", missing.description);
    }

    let ct = CancellationToken::new();
    let app = create_router(AppState::new(db, verifier, config), ct.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(?variant, "API server listening on http://{}", addr);
    info!("API docs available at http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("shutting down");
            ct.cancel();
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

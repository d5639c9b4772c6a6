//! System health and status handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::config::MissingSetting;
use crate::auth::SessionVerifier;
use crate::db::Database;

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Ticket Board API")]
    pub message: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "ok")]
    pub status: String,
}

/// Configuration check response
#[derive(Serialize, ToSchema)]
pub struct HealthcheckResponse {
    /// `ok` or `error`
    #[schema(example = "error")]
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<MissingSetting>,
    pub message: String,
}

/// Name of the API this run serves
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "API name", body = MessageResponse)
    )
)]
#[instrument(skip(state))]
pub async fn root<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: state.config().variant.api_name().to_string(),
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Report identity settings that still need to be configured
#[utoipa::path(
    get,
    path = "/api/healthcheck",
    tag = "system",
    responses(
        (status = 200, description = "Configuration status", body = HealthcheckResponse)
    )
)]
#[instrument(skip(state))]
pub async fn healthcheck<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
) -> Json<HealthcheckResponse> {
    let errors = state.config().missing_settings();

    Json(if errors.is_empty() {
        HealthcheckResponse {
            status: "ok".to_string(),
            errors,
            message: "All environment variables are configured correctly".to_string(),
        }
    } else {
        HealthcheckResponse {
            status: "error".to_string(),
            errors,
            message: "Backend configuration is incomplete. Set the missing environment variables."
                .to_string(),
        }
    })
}

//! OAuth discovery metadata for tool-call clients. No authentication.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::HOST},
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::{AppState, Config};
use crate::auth::SessionVerifier;
use crate::db::Database;

const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Protected-resource metadata (RFC 9728).
#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResourceMetadata {
    #[schema(example = "http://localhost:3001")]
    pub resource: String,
    pub authorization_servers: Vec<String>,
    pub scopes_supported: Vec<String>,
}

/// Authorization-server metadata (RFC 8414).
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorizationServerMetadata {
    pub issuer: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub registration_endpoint: String,
    pub scopes_supported: Vec<String>,
    pub response_types_supported: Vec<String>,
    pub response_modes_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    pub code_challenge_methods_supported: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Externally visible base URL: the configured one, else scheme and host
/// from the request.
pub fn base_url(config: &Config, headers: &HeaderMap) -> String {
    if let Some(url) = &config.public_base_url {
        return url.trim_end_matches('/').to_string();
    }

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(HOST))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

#[utoipa::path(
    get,
    path = "/.well-known/oauth-protected-resource",
    tag = "oauth",
    responses(
        (status = 200, description = "Protected-resource metadata", body = ProtectedResourceMetadata)
    )
)]
#[instrument(skip(state, headers))]
pub async fn protected_resource<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    headers: HeaderMap,
) -> Json<ProtectedResourceMetadata> {
    let config = state.config();
    Json(ProtectedResourceMetadata {
        resource: base_url(config, &headers),
        authorization_servers: config
            .stytch_domain()
            .map(str::to_string)
            .into_iter()
            .collect(),
        scopes_supported: strings(&SCOPES),
    })
}

#[utoipa::path(
    get,
    path = "/.well-known/oauth-authorization-server",
    tag = "oauth",
    responses(
        (status = 200, description = "Authorization-server metadata", body = AuthorizationServerMetadata)
    )
)]
#[instrument(skip(state, headers))]
pub async fn authorization_server<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    headers: HeaderMap,
) -> Json<AuthorizationServerMetadata> {
    let config = state.config();
    let base = base_url(config, &headers);
    let domain = config.stytch_domain().unwrap_or_default();

    Json(AuthorizationServerMetadata {
        issuer: config.stytch_domain().map(str::to_string),
        authorization_endpoint: format!("{}/oauth/authorize", base),
        token_endpoint: format!("{}/v1/oauth2/token", domain),
        registration_endpoint: format!("{}/v1/oauth2/register", domain),
        scopes_supported: strings(&SCOPES),
        response_types_supported: strings(&["code"]),
        response_modes_supported: strings(&["query"]),
        grant_types_supported: strings(&["authorization_code", "refresh_token"]),
        token_endpoint_auth_methods_supported: strings(&["none"]),
        code_challenge_methods_supported: strings(&["S256"]),
    })
}

//! Authorization Gate for tool calls.
//!
//! Every request to the MCP endpoint must carry a bearer access token. The
//! verified [`Principal`] rides in the request extensions; rmcp hands the
//! request parts to tool handlers, which read it back with
//! [`principal_from`].

use axum::{
    Json,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use rmcp::{ErrorData as McpError, RoleServer, service::RequestContext};
use tracing::{debug, warn};

use crate::api::{AppState, ErrorResponse, base_url};
use crate::auth::{OrgScope, OwnerScope, Principal, SessionVerifier};
use crate::db::Database;

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware in front of the MCP service.
pub async fn require_bearer<D: Database, V: SessionVerifier>(
    State(state): State<AppState<D, V>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(req.headers()).map(str::to_string) else {
        debug!("tool call without bearer token");
        return challenge(&state, req.headers());
    };

    match state.verifier().authenticate_access_token(&token).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            warn!(error = %e, "access token rejected");
            challenge(&state, req.headers())
        }
    }
}

/// 401 pointing the client at the protected-resource metadata.
fn challenge<D: Database, V: SessionVerifier>(
    state: &AppState<D, V>,
    headers: &HeaderMap,
) -> Response {
    let metadata = format!(
        "{}/.well-known/oauth-protected-resource/mcp",
        base_url(state.config(), headers)
    );

    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized".to_string(),
        }),
    )
        .into_response();

    if let Ok(value) =
        HeaderValue::from_str(&format!("Bearer resource_metadata=\"{}\"", metadata))
    {
        response.headers_mut().insert(WWW_AUTHENTICATE, value);
    }
    response
}

/// The principal the gate attached to this call. Fails closed.
pub fn principal_from(ctx: &RequestContext<RoleServer>) -> Result<Principal, McpError> {
    ctx.extensions
        .get::<Parts>()
        .and_then(|parts| parts.extensions.get::<Principal>())
        .cloned()
        .ok_or_else(|| McpError::internal_error("unauthorized", None))
}

pub(crate) fn org_scope(principal: &Principal) -> Result<OrgScope, McpError> {
    principal
        .org_scope()
        .map_err(|_| McpError::internal_error("unauthorized", None))
}

pub(crate) fn owner_scope(principal: &Principal) -> OwnerScope {
    principal.owner_scope()
}

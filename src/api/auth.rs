//! Authorization Gate for REST routes.
//!
//! The session credential travels in a cookie. Handlers that take
//! [`Authenticated`] never run for a request whose credential fails
//! verification, and they get their scope only from it.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, request::Parts};
use tracing::{debug, warn};

use super::AppState;
use super::error::{HandlerError, unauthorized};
use crate::auth::{OrgScope, OwnerScope, Principal, SessionVerifier};
use crate::db::Database;

/// The verified caller of a REST request.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    /// Organization scope; a principal without a tenant is unauthorized.
    pub fn org_scope(&self) -> Result<OrgScope, HandlerError> {
        self.0.org_scope().map_err(|e| {
            warn!(error = %e, "session has no organization");
            unauthorized()
        })
    }

    pub fn owner_scope(&self) -> OwnerScope {
        self.0.owner_scope()
    }
}

impl<D, V> FromRequestParts<AppState<D, V>> for Authenticated
where
    D: Database,
    V: SessionVerifier,
{
    type Rejection = HandlerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D, V>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, &state.config().session_cookie) else {
            debug!("request without session cookie");
            return Err(unauthorized());
        };

        match state.verifier().authenticate_session(&token).await {
            Ok(principal) => Ok(Authenticated(principal)),
            Err(e) => {
                warn!(error = %e, "session verification failed");
                Err(unauthorized())
            }
        }
    }
}

/// Value of the named cookie across all `Cookie` headers, if non-empty.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

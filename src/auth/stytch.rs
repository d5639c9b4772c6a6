//! Client for the identity provider's session-authentication API.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::verifier::http_client;
use super::{AuthError, AuthResult, IdentityMode, Principal};

/// Provider connection settings.
#[derive(Debug, Clone)]
pub struct StytchSettings {
    /// Base URL of the provider API, e.g. `https://test.stytch.com`.
    pub base_url: String,
    pub project_id: String,
    pub secret: String,
}

/// Calls the provider to validate session tokens and session JWTs.
pub struct StytchClient {
    http: reqwest::Client,
    settings: StytchSettings,
    mode: IdentityMode,
}

#[derive(Debug, Deserialize)]
struct B2bSessionResponse {
    member_session: Option<MemberSession>,
    organization: Option<OrganizationRef>,
}

#[derive(Debug, Deserialize)]
struct MemberSession {
    member_session_id: Option<String>,
    member_id: Option<String>,
    organization_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationRef {
    organization_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConsumerSessionResponse {
    session: Option<UserSession>,
}

#[derive(Debug, Deserialize)]
struct UserSession {
    session_id: Option<String>,
    user_id: Option<String>,
}

impl StytchClient {
    pub fn new(settings: StytchSettings, mode: IdentityMode) -> AuthResult<Self> {
        if settings.project_id.is_empty() || settings.secret.is_empty() {
            return Err(AuthError::Configuration {
                message: "STYTCH_PROJECT_ID and STYTCH_SECRET must be set".to_string(),
            });
        }

        Ok(Self {
            http: http_client()?,
            settings,
            mode,
        })
    }

    /// Validate a session credential and extract the principal.
    ///
    /// Three-segment tokens are sent as session JWTs, anything else as an
    /// opaque session token.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Principal> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let path = match self.mode {
            IdentityMode::B2b => "/v1/b2b/sessions/authenticate",
            IdentityMode::Consumer => "/v1/sessions/authenticate",
        };
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);

        let body = if is_jwt(token) {
            json!({ "session_jwt": token })
        } else {
            json!({ "session_token": token })
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.project_id, Some(&self.settings.secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            debug!(%status, "identity provider rejected session");
            return Err(AuthError::invalid(format!("session rejected ({})", status)));
        }
        if !status.is_success() {
            return Err(AuthError::Provider {
                message: format!("session authenticate returned {}", status),
            });
        }

        match self.mode {
            IdentityMode::B2b => {
                let parsed: B2bSessionResponse = response.json().await?;
                principal_from_b2b(parsed)
            }
            IdentityMode::Consumer => {
                let parsed: ConsumerSessionResponse = response.json().await?;
                principal_from_consumer(parsed)
            }
        }
    }
}

fn principal_from_b2b(resp: B2bSessionResponse) -> AuthResult<Principal> {
    let session = resp
        .member_session
        .ok_or_else(|| AuthError::missing_claim("member_session"))?;

    let member_id =
        non_empty(session.member_id).ok_or_else(|| AuthError::missing_claim("member_id"))?;

    let organization_id = non_empty(session.organization_id)
        .or_else(|| resp.organization.and_then(|o| non_empty(o.organization_id)))
        .ok_or_else(|| AuthError::missing_claim("organization_id"))?;

    let principal = Principal::new(member_id, Some(organization_id));
    Ok(match non_empty(session.member_session_id) {
        Some(id) => principal.with_session_id(id),
        None => principal,
    })
}

fn principal_from_consumer(resp: ConsumerSessionResponse) -> AuthResult<Principal> {
    let session = resp
        .session
        .ok_or_else(|| AuthError::missing_claim("session"))?;

    let user_id =
        non_empty(session.user_id).ok_or_else(|| AuthError::missing_claim("user_id"))?;

    let principal = Principal::new(user_id, None);
    Ok(match non_empty(session.session_id) {
        Some(id) => principal.with_session_id(id),
        None => principal,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Whether a credential has the three dot-separated segments of a JWT.
pub fn is_jwt(token: &str) -> bool {
    token.split('.').count() == 3
}

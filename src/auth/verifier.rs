//! The Session Verifier seam.

use std::future::Future;

use super::{AuthResult, JwtVerifier, Principal, StytchClient};

/// Which identity-provider product the credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// Members of organizations. Principals always carry a tenant.
    B2b,
    /// Individual users. Principals carry only a subject.
    Consumer,
}

/// Turns an inbound credential into a [`Principal`] or fails.
///
/// Implementations never return a partially populated principal: a missing
/// claim is an error.
pub trait SessionVerifier: Send + Sync + 'static {
    /// Verify a browser session credential (opaque token or session JWT).
    fn authenticate_session(
        &self,
        token: &str,
    ) -> impl Future<Output = AuthResult<Principal>> + Send;

    /// Verify a bearer access token presented by a tool-call client.
    fn authenticate_access_token(
        &self,
        token: &str,
    ) -> impl Future<Output = AuthResult<Principal>> + Send;
}

/// Production verifier: session credentials go to the provider's session
/// API, access tokens are checked locally against the published key set.
pub struct StytchVerifier {
    sessions: StytchClient,
    tokens: JwtVerifier,
}

impl StytchVerifier {
    pub fn new(sessions: StytchClient, tokens: JwtVerifier) -> Self {
        Self { sessions, tokens }
    }
}

impl SessionVerifier for StytchVerifier {
    async fn authenticate_session(&self, token: &str) -> AuthResult<Principal> {
        self.sessions.authenticate(token).await
    }

    async fn authenticate_access_token(&self, token: &str) -> AuthResult<Principal> {
        self.tokens.verify(token).await
    }
}

/// Build the outbound HTTP client used for provider calls.
pub(crate) fn http_client() -> AuthResult<reqwest::Client> {
    // reqwest is built without a bundled crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| super::AuthError::Configuration {
            message: e.to_string(),
        })
}

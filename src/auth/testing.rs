//! Test double for the session verifier.

use std::collections::HashMap;

use super::{AuthError, AuthResult, Principal, SessionVerifier};

/// Accepts a fixed set of credentials, each mapped to a principal.
/// The same table serves session cookies and bearer tokens.
#[derive(Default, Clone)]
pub struct StaticVerifier {
    principals: HashMap<String, Principal>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: &str, principal: Principal) -> Self {
        self.principals.insert(token.to_string(), principal);
        self
    }

    fn lookup(&self, token: &str) -> AuthResult<Principal> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.principals
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::invalid("unknown test token"))
    }
}

impl SessionVerifier for StaticVerifier {
    async fn authenticate_session(&self, token: &str) -> AuthResult<Principal> {
        self.lookup(token)
    }

    async fn authenticate_access_token(&self, token: &str) -> AuthResult<Principal> {
        self.lookup(token)
    }
}

/// A member of `org` in a B2B deployment.
pub fn member(subject: &str, org: &str) -> Principal {
    Principal::new(subject, Some(org.to_string()))
}

/// A consumer user.
pub fn user(subject: &str) -> Principal {
    Principal::new(subject, None)
}

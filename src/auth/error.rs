//! Authentication error types.
//!
//! Every variant is reported to callers as a bare "unauthorized"; the detail
//! only reaches the logs.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum AuthError {
    #[error("No credential presented")]
    #[diagnostic(code(taskboard::auth::missing_credential))]
    MissingCredential,

    #[error("Invalid credential: {message}")]
    #[diagnostic(code(taskboard::auth::invalid_credential))]
    InvalidCredential { message: String },

    #[error("Credential expired")]
    #[diagnostic(code(taskboard::auth::expired))]
    Expired,

    #[error("Verified credential is missing the '{claim}' claim")]
    #[diagnostic(code(taskboard::auth::missing_claim))]
    MissingClaim { claim: String },

    #[error("Identity provider error: {message}")]
    #[diagnostic(
        code(taskboard::auth::provider),
        help("Check STYTCH_DOMAIN and that the identity provider is reachable.")
    )]
    Provider { message: String },

    #[error("Authentication is misconfigured: {message}")]
    #[diagnostic(code(taskboard::auth::configuration))]
    Configuration { message: String },
}

impl AuthError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AuthError::InvalidCredential {
            message: message.into(),
        }
    }

    pub(crate) fn missing_claim(claim: &str) -> Self {
        AuthError::MissingClaim {
            claim: claim.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Provider {
            message: e.to_string(),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

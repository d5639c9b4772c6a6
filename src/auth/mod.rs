//! Session verification against the external identity provider.
//!
//! - `principal`: the per-request identity and the scopes derived from it
//! - `verifier`: the `SessionVerifier` seam and its production implementation
//! - `stytch`: session-authentication API client (cookie sessions)
//! - `jwt`: bearer access-token verification (tool calls)

mod error;
mod jwt;
mod principal;
mod stytch;
mod verifier;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod jwt_test;

pub use error::{AuthError, AuthResult};
pub use jwt::{AccessTokenClaims, JwtSettings, JwtVerifier, ORGANIZATION_CLAIM};
pub use principal::{OrgScope, OwnerScope, Principal};
pub use stytch::{StytchClient, StytchSettings, is_jwt};
pub use verifier::{IdentityMode, SessionVerifier, StytchVerifier};

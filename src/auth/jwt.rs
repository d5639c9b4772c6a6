//! Bearer access-token verification against a published key set.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::verifier::http_client;
use super::{AuthError, AuthResult, IdentityMode, Principal};

/// Shortest gap between two key set fetches.
pub const MIN_KEY_REFRESH: Duration = Duration::from_secs(30);

/// Claim under which the provider nests organization details.
pub const ORGANIZATION_CLAIM: &str = "https://stytch.com/organization";

/// Token validation settings. Issuer, audience and algorithm are fixed by
/// configuration; nothing in the token header can change them.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub issuer: String,
    pub audience: String,
    pub algorithm: Algorithm,
}

/// Claims read from a verified access token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    #[serde(rename = "https://stytch.com/organization", default)]
    pub organization: Option<OrganizationClaim>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationClaim {
    pub organization_id: String,
}

#[derive(Default)]
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeyCache {
    fn fresh(&self, min_refresh: Duration) -> bool {
        self.fetched_at.is_some_and(|at| at.elapsed() < min_refresh)
    }
}

enum KeySource {
    /// Keys fetched from a JWKS endpoint, keyed by `kid`.
    Remote {
        url: String,
        http: reqwest::Client,
        min_refresh: Duration,
        cache: RwLock<KeyCache>,
    },
    /// A single fixed key.
    Static(DecodingKey),
}

/// Verifies access tokens and maps their claims onto a [`Principal`].
pub struct JwtVerifier {
    validation: Validation,
    algorithm: Algorithm,
    mode: IdentityMode,
    keys: KeySource,
}

impl JwtVerifier {
    /// Verifier that loads keys from `jwks_url`, refreshing when a token
    /// names a key it has not seen.
    pub fn with_jwks(
        settings: JwtSettings,
        jwks_url: impl Into<String>,
        mode: IdentityMode,
    ) -> AuthResult<Self> {
        Ok(Self::build(
            settings,
            mode,
            KeySource::Remote {
                url: jwks_url.into(),
                http: http_client()?,
                min_refresh: MIN_KEY_REFRESH,
                cache: RwLock::new(KeyCache::default()),
            },
        ))
    }

    /// Override the minimum gap between key set fetches.
    pub fn with_min_refresh(mut self, interval: Duration) -> Self {
        if let KeySource::Remote { min_refresh, .. } = &mut self.keys {
            *min_refresh = interval;
        }
        self
    }

    /// Verifier with one fixed decoding key.
    pub fn with_key(settings: JwtSettings, key: DecodingKey, mode: IdentityMode) -> Self {
        Self::build(settings, mode, KeySource::Static(key))
    }

    fn build(settings: JwtSettings, mode: IdentityMode, keys: KeySource) -> Self {
        let mut validation = Validation::new(settings.algorithm);
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            validation,
            algorithm: settings.algorithm,
            mode,
            keys,
        }
    }

    /// Verify the signature and registered claims, then extract the principal.
    pub async fn verify(&self, token: &str) -> AuthResult<Principal> {
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::invalid(format!("malformed token header: {}", e)))?;

        if header.alg != self.algorithm {
            return Err(AuthError::invalid(format!(
                "unexpected algorithm {:?}",
                header.alg
            )));
        }

        let key = self.key_for(header.kid.as_deref()).await?;

        let data = jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::invalid(e.to_string()),
            })?;

        self.principal_from_claims(data.claims)
    }

    fn principal_from_claims(&self, claims: AccessTokenClaims) -> AuthResult<Principal> {
        if claims.sub.is_empty() {
            return Err(AuthError::missing_claim("sub"));
        }

        match self.mode {
            IdentityMode::B2b => {
                let organization_id = claims
                    .organization
                    .map(|o| o.organization_id)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| AuthError::missing_claim(ORGANIZATION_CLAIM))?;
                Ok(Principal::new(claims.sub, Some(organization_id)))
            }
            IdentityMode::Consumer => Ok(Principal::new(claims.sub, None)),
        }
    }

    async fn key_for(&self, kid: Option<&str>) -> AuthResult<DecodingKey> {
        match &self.keys {
            KeySource::Static(key) => Ok(key.clone()),
            KeySource::Remote {
                url,
                http,
                min_refresh,
                cache,
            } => {
                let kid = kid.ok_or_else(|| AuthError::invalid("token header has no kid"))?;
                let unknown = || AuthError::invalid(format!("unknown signing key '{}'", kid));

                if let Some(key) = cache.read().await.keys.get(kid) {
                    return Ok(key.clone());
                }

                let mut cache = cache.write().await;
                if let Some(key) = cache.keys.get(kid) {
                    return Ok(key.clone());
                }
                if cache.fresh(*min_refresh) {
                    debug!(kid, "key set refreshed recently, not fetching");
                    return Err(unknown());
                }

                cache.keys = fetch_jwks(http, url).await?;
                cache.fetched_at = Some(Instant::now());
                cache.keys.get(kid).cloned().ok_or_else(unknown)
            }
        }
    }
}

async fn fetch_jwks(
    http: &reqwest::Client,
    url: &str,
) -> AuthResult<HashMap<String, DecodingKey>> {
    debug!(url, "fetching signing keys");

    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(AuthError::Provider {
            message: format!("key set endpoint returned {}", response.status()),
        });
    }

    let set: JwkSet = response.json().await?;
    let mut keys = HashMap::new();
    for jwk in &set.keys {
        let Some(kid) = jwk.common.key_id.clone() else {
            continue;
        };
        match DecodingKey::from_jwk(jwk) {
            Ok(key) => {
                keys.insert(kid, key);
            }
            Err(e) => debug!(kid, error = %e, "skipping unusable key"),
        }
    }

    info!(count = keys.len(), "loaded signing keys");
    Ok(keys)
}

//! Server configuration.
//!
//! Precedence is CLI flag > environment > default: [`Config::new`] reads the
//! environment, the binary then applies its flags through the `with_*`
//! builders.

use std::env;
use std::net::{IpAddr, Ipv4Addr};

use jsonwebtoken::Algorithm;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{
    AuthError, AuthResult, IdentityMode, JwtSettings, JwtVerifier, StytchClient, StytchSettings,
    StytchVerifier,
};

/// Which product a run serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// Organization-scoped ticket board.
    #[default]
    Tickets,
    /// Per-user task list.
    Tasks,
}

impl Variant {
    pub fn identity_mode(&self) -> IdentityMode {
        match self {
            Variant::Tickets => IdentityMode::B2b,
            Variant::Tasks => IdentityMode::Consumer,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            Variant::Tickets => "Ticket Board API",
            Variant::Tasks => "Task List API",
        }
    }
}

/// An identity setting the server cannot authenticate without.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MissingSetting {
    #[schema(example = "STYTCH_DOMAIN")]
    pub variable: String,
    pub description: String,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub variant: Variant,
    pub stytch_project_id: Option<String>,
    pub stytch_secret: Option<String>,
    /// Identity provider domain: token issuer, key set host and API base.
    pub stytch_domain: Option<String>,
    /// Public base URL; derived from request headers when unset.
    pub public_base_url: Option<String>,
    /// Cookie carrying the browser session credential.
    pub session_cookie: String,
    pub jwt_algorithm: Algorithm,
    /// Expected access-token audience; the project id when unset.
    pub jwt_audience: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3001,
            variant: Variant::default(),
            stytch_project_id: None,
            stytch_secret: None,
            stytch_domain: None,
            public_base_url: None,
            session_cookie: "stytch_session_jwt".to_string(),
            jwt_algorithm: Algorithm::RS256,
            jwt_audience: None,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Defaults overlaid with identity settings from the environment.
    pub fn new() -> Self {
        Self {
            stytch_project_id: env_value("STYTCH_PROJECT_ID"),
            stytch_secret: env_value("STYTCH_SECRET")
                .or_else(|| env_value("STYTCH_PROJECT_SECRET")),
            stytch_domain: env_value("STYTCH_DOMAIN"),
            public_base_url: env_value("PUBLIC_BASE_URL"),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_stytch(
        mut self,
        project_id: impl Into<String>,
        secret: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        self.stytch_project_id = Some(project_id.into());
        self.stytch_secret = Some(secret.into());
        self.stytch_domain = Some(domain.into());
        self
    }

    pub fn with_stytch_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.stytch_project_id = Some(project_id.into());
        self
    }

    pub fn with_stytch_secret(mut self, secret: impl Into<String>) -> Self {
        self.stytch_secret = Some(secret.into());
        self
    }

    pub fn with_stytch_domain(mut self, domain: impl Into<String>) -> Self {
        self.stytch_domain = Some(domain.into());
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    pub fn with_jwt_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.jwt_algorithm = algorithm;
        self
    }

    pub fn with_jwt_audience(mut self, audience: impl Into<String>) -> Self {
        self.jwt_audience = Some(audience.into());
        self
    }

    /// Domain with any trailing slash removed.
    pub fn stytch_domain(&self) -> Option<&str> {
        self.stytch_domain
            .as_deref()
            .map(|d| d.trim_end_matches('/'))
    }

    /// Identity settings that are unset, in a stable order.
    pub fn missing_settings(&self) -> Vec<MissingSetting> {
        let checks = [
            (
                &self.stytch_project_id,
                "STYTCH_PROJECT_ID",
                "Your Stytch project ID (e.g., project-test-...)",
            ),
            (
                &self.stytch_secret,
                "STYTCH_SECRET",
                "Your Stytch secret key from Project Settings",
            ),
            (
                &self.stytch_domain,
                "STYTCH_DOMAIN",
                "Your Stytch domain (e.g., https://test.stytch.com)",
            ),
        ];

        checks
            .into_iter()
            .filter(|(value, _, _)| value.as_deref().is_none_or(str::is_empty))
            .map(|(_, variable, description)| MissingSetting {
                variable: variable.to_string(),
                description: description.to_string(),
            })
            .collect()
    }

    fn jwt_settings(&self, domain: &str, project_id: &str) -> JwtSettings {
        JwtSettings {
            issuer: domain.to_string(),
            audience: self
                .jwt_audience
                .clone()
                .unwrap_or_else(|| project_id.to_string()),
            algorithm: self.jwt_algorithm,
        }
    }

    /// Build the production verifier for this run's variant.
    pub fn stytch_verifier(&self) -> AuthResult<StytchVerifier> {
        let (Some(project_id), Some(secret), Some(domain)) = (
            self.stytch_project_id.as_deref(),
            self.stytch_secret.as_deref(),
            self.stytch_domain(),
        ) else {
            let names: Vec<String> = self
                .missing_settings()
                .into_iter()
                .map(|m| m.variable)
                .collect();
            return Err(AuthError::Configuration {
                message: format!("missing settings: {}", names.join(", ")),
            });
        };

        let mode = self.variant.identity_mode();
        let sessions = StytchClient::new(
            StytchSettings {
                base_url: domain.to_string(),
                project_id: project_id.to_string(),
                secret: secret.to_string(),
            },
            mode,
        )?;
        let tokens = JwtVerifier::with_jwks(
            self.jwt_settings(domain, project_id),
            format!("{}/.well-known/jwks.json", domain),
            mode,
        )?;

        Ok(StytchVerifier::new(sessions, tokens))
    }
}

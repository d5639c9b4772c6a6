//! Taskboard server binary.
//!
//! Creates the concrete database and identity verifier and hands them to
//! the API server, which stays agnostic of both.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use jsonwebtoken::Algorithm;
use miette::Diagnostic;
use taskboard::api::{self, ApiError, Config, Variant};
use taskboard::auth::AuthError;
use taskboard::db::{Database, DbError, SqliteDatabase};
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(taskboard::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(taskboard::binary::io))]
    Io(#[from] std::io::Error),

    #[error("Identity provider setup failed: {0}")]
    #[diagnostic(
        code(taskboard::binary::auth),
        help("Set STYTCH_PROJECT_ID, STYTCH_SECRET and STYTCH_DOMAIN")
    )]
    Auth(#[from] AuthError),

    #[error("API server error: {0}")]
    #[diagnostic(code(taskboard::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "taskboard-server")]
#[command(author, version, about = "Ticket board and task list server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, env = "TASKBOARD_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "TASKBOARD_PORT", default_value = "3001")]
    port: u16,

    /// Database file path
    #[arg(long, env = "TASKBOARD_DB", default_value = "taskboard.db")]
    db: PathBuf,

    /// Which product to serve
    #[arg(long, env = "TASKBOARD_VARIANT", value_enum, default_value_t = Variant::Tickets)]
    variant: Variant,

    /// Identity provider project id
    #[arg(long, env = "STYTCH_PROJECT_ID")]
    stytch_project_id: Option<String>,

    /// Identity provider secret (STYTCH_PROJECT_SECRET is also read)
    #[arg(long, env = "STYTCH_SECRET", hide_env_values = true)]
    stytch_secret: Option<String>,

    /// Identity provider domain
    #[arg(long, env = "STYTCH_DOMAIN")]
    stytch_domain: Option<String>,

    /// Public base URL advertised in metadata and auth challenges
    #[arg(long, env = "PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Cookie carrying the browser session
    #[arg(long)]
    session_cookie: Option<String>,

    /// Signing algorithm expected on access tokens
    #[arg(long, value_parser = parse_algorithm)]
    jwt_algorithm: Option<Algorithm>,

    /// Expected access-token audience (defaults to the project id)
    #[arg(long, env = "TASKBOARD_JWT_AUDIENCE")]
    jwt_audience: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_algorithm(value: &str) -> Result<Algorithm, String> {
    value
        .parse()
        .map_err(|_| format!("unsupported algorithm '{}'", value))
}

impl Cli {
    /// Environment-derived config with flags applied on top.
    fn into_config(self) -> Config {
        let mut config = Config::new()
            .with_host(self.host)
            .with_port(self.port)
            .with_variant(self.variant);

        if let Some(project_id) = present(self.stytch_project_id) {
            config = config.with_stytch_project_id(project_id);
        }
        if let Some(secret) = present(self.stytch_secret) {
            config = config.with_stytch_secret(secret);
        }
        if let Some(domain) = present(self.stytch_domain) {
            config = config.with_stytch_domain(domain);
        }
        if let Some(url) = present(self.public_base_url) {
            config = config.with_public_base_url(url);
        }
        if let Some(cookie) = self.session_cookie {
            config = config.with_session_cookie(cookie);
        }
        if let Some(algorithm) = self.jwt_algorithm {
            config = config.with_jwt_algorithm(algorithm);
        }
        if let Some(audience) = self.jwt_audience {
            config = config.with_jwt_audience(audience);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    let cli = Cli::parse();
    api::init_tracing();

    if let Some(parent) = cli.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    info!(path = %cli.db.display(), "opening database");
    let db = SqliteDatabase::open(&cli.db).await?;
    db.migrate().await?;
    info!("database migrations complete");

    let config = cli.into_config();
    let verifier = config.stytch_verifier()?;

    api::run(config, db, verifier).await?;
    Ok(())
}

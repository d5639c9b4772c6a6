//! Tests for OAuth discovery metadata.

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header::HOST},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use super::base_url;
use crate::api::{AppState, Config, create_router};
use crate::auth::testing::StaticVerifier;
use crate::db::{Database, SqliteDatabase};

async fn app_with(config: Config) -> Router {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create test database");
    db.migrate().await.expect("Failed to run migrations");

    create_router(
        AppState::new(db, StaticVerifier::new(), config),
        CancellationToken::new(),
    )
}

fn configured() -> Config {
    Config::default().with_stytch(
        "project-test-123",
        "secret-test-456",
        "https://auth.example.com/",
    )
}

async fn get_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[test]
fn base_url_prefers_configured_value() {
    let config = Config::default().with_public_base_url("https://board.example.com/");
    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_static("internal:3001"));

    assert_eq!(base_url(&config, &headers), "https://board.example.com");
}

#[test]
fn base_url_uses_forwarded_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_static("internal:3001"));
    headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
    headers.insert("x-forwarded-host", HeaderValue::from_static("board.example.com"));

    assert_eq!(
        base_url(&Config::default(), &headers),
        "https://board.example.com"
    );
}

#[test]
fn base_url_falls_back_to_host_then_localhost() {
    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_static("127.0.0.1:3001"));
    assert_eq!(
        base_url(&Config::default(), &headers),
        "http://127.0.0.1:3001"
    );

    assert_eq!(
        base_url(&Config::default(), &HeaderMap::new()),
        "http://localhost"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn protected_resource_metadata() {
    let app = app_with(configured()).await;

    let (status, body) = get_json(
        app,
        Request::builder()
            .uri("/.well-known/oauth-protected-resource")
            .header(HOST, "board.example.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resource"], "http://board.example.com");
    assert_eq!(body["authorization_servers"][0], "https://auth.example.com");
    assert_eq!(body["scopes_supported"][0], "openid");
}

#[tokio::test(flavor = "multi_thread")]
async fn protected_resource_metadata_for_sub_path() {
    let app = app_with(configured()).await;

    let (status, body) = get_json(
        app,
        Request::builder()
            .uri("/.well-known/oauth-protected-resource/mcp")
            .header(HOST, "board.example.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resource"], "http://board.example.com");
}

#[tokio::test(flavor = "multi_thread")]
async fn authorization_server_metadata() {
    let app = app_with(configured().with_public_base_url("https://board.example.com")).await;

    let (status, body) = get_json(
        app,
        Request::builder()
            .uri("/.well-known/oauth-authorization-server")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issuer"], "https://auth.example.com");
    assert_eq!(
        body["authorization_endpoint"],
        "https://board.example.com/oauth/authorize"
    );
    assert_eq!(
        body["token_endpoint"],
        "https://auth.example.com/v1/oauth2/token"
    );
    assert_eq!(
        body["registration_endpoint"],
        "https://auth.example.com/v1/oauth2/register"
    );
    assert_eq!(body["code_challenge_methods_supported"][0], "S256");
}

#[tokio::test(flavor = "multi_thread")]
async fn metadata_without_identity_settings() {
    let app = app_with(Config::default()).await;

    let (status, body) = get_json(
        app,
        Request::builder()
            .uri("/.well-known/oauth-authorization-server")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["issuer"].is_null());
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, routing::get};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{Value, json};

use super::{AuthError, IdentityMode, JwtSettings, JwtVerifier};

const SECRET: &[u8] = b"taskboard-test-signing-key-0123456789abcdefgh";
const SECRET_B64: &str = "dGFza2JvYXJkLXRlc3Qtc2lnbmluZy1rZXktMDEyMzQ1Njc4OWFiY2RlZmdo";
const ISSUER: &str = "https://auth.example.test";
const AUDIENCE: &str = "project-test-123";

fn settings() -> JwtSettings {
    JwtSettings {
        issuer: ISSUER.to_string(),
        audience: AUDIENCE.to_string(),
        algorithm: Algorithm::HS256,
    }
}

fn verifier(mode: IdentityMode) -> JwtVerifier {
    JwtVerifier::with_key(settings(), DecodingKey::from_secret(SECRET), mode)
}

fn claims(sub: &str, org: Option<&str>) -> Value {
    let mut claims = json!({
        "sub": sub,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": Utc::now().timestamp() + 600,
    });
    if let Some(org) = org {
        claims["https://stytch.com/organization"] = json!({ "organization_id": org });
    }
    claims
}

fn sign(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_string);
    jsonwebtoken::encode(&header, claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_b2b_token_yields_member_and_org() {
    let token = sign(&claims("member-1", Some("org-a")), None);

    let principal = verifier(IdentityMode::B2b).verify(&token).await.unwrap();

    assert_eq!(principal.subject_id(), "member-1");
    assert_eq!(principal.tenant_id(), Some("org-a"));
    assert_eq!(principal.org_scope().unwrap().organization_id(), "org-a");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_consumer_token_yields_subject_only() {
    let token = sign(&claims("user-1", None), None);

    let principal = verifier(IdentityMode::Consumer)
        .verify(&token)
        .await
        .unwrap();

    assert_eq!(principal.subject_id(), "user-1");
    assert_eq!(principal.tenant_id(), None);
    assert_eq!(principal.owner_scope().user_id(), "user-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_b2b_token_without_org_claim_is_rejected() {
    let token = sign(&claims("member-1", None), None);

    let err = verifier(IdentityMode::B2b).verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::MissingClaim { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_is_rejected() {
    let mut expired = claims("member-1", Some("org-a"));
    expired["exp"] = json!(Utc::now().timestamp() - 3600);
    let token = sign(&expired, None);

    let err = verifier(IdentityMode::B2b).verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::Expired));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_audience_is_rejected() {
    let mut other = claims("member-1", Some("org-a"));
    other["aud"] = json!("some-other-project");
    let token = sign(&other, None);

    let err = verifier(IdentityMode::B2b).verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredential { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_issuer_is_rejected() {
    let mut other = claims("member-1", Some("org-a"));
    other["iss"] = json!("https://evil.example.test");
    let token = sign(&other, None);

    let err = verifier(IdentityMode::B2b).verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredential { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_signature_is_rejected() {
    let claims = claims("member-1", Some("org-a"));
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"not-the-right-key"),
    )
    .unwrap();

    let err = verifier(IdentityMode::B2b).verify(&token).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredential { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_and_empty_tokens_are_rejected() {
    let v = verifier(IdentityMode::B2b);

    assert!(matches!(
        v.verify("").await.unwrap_err(),
        AuthError::MissingCredential
    ));
    assert!(matches!(
        v.verify("not-a-jwt").await.unwrap_err(),
        AuthError::InvalidCredential { .. }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_key_set_is_fetched_by_kid() {
    let jwks = json!({
        "keys": [{ "kty": "oct", "kid": "key-1", "k": SECRET_B64 }]
    });
    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let jwks = jwks.clone();
            async move { Json(jwks) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let verifier = JwtVerifier::with_jwks(
        settings(),
        format!("http://{}/.well-known/jwks.json", addr),
        IdentityMode::B2b,
    )
    .unwrap();

    let token = sign(&claims("member-1", Some("org-a")), Some("key-1"));
    let principal = verifier.verify(&token).await.unwrap();
    assert_eq!(principal.tenant_id(), Some("org-a"));

    let unknown = sign(&claims("member-1", Some("org-a")), Some("key-2"));
    let err = verifier.verify(&unknown).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredential { .. }));
}

/// Serve a one-key JWKS and count the fetches.
async fn counting_key_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Json(json!({
                    "keys": [{ "kty": "oct", "kid": "key-1", "k": SECRET_B64 }]
                }))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/.well-known/jwks.json", addr), hits)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_kid_does_not_refetch_within_refresh_interval() {
    let (url, hits) = counting_key_server().await;
    let verifier = JwtVerifier::with_jwks(settings(), url, IdentityMode::B2b).unwrap();

    let token = sign(&claims("member-1", Some("org-a")), Some("key-1"));
    verifier.verify(&token).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let unknown = sign(&claims("member-1", Some("org-a")), Some("key-9"));
    for _ in 0..5 {
        let err = verifier.verify(&unknown).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential { .. }));
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    verifier.verify(&token).await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_kid_refetches_once_interval_has_passed() {
    let (url, hits) = counting_key_server().await;
    let verifier = JwtVerifier::with_jwks(settings(), url, IdentityMode::B2b)
        .unwrap()
        .with_min_refresh(Duration::ZERO);

    let unknown = sign(&claims("member-1", Some("org-a")), Some("key-9"));
    verifier.verify(&unknown).await.unwrap_err();
    verifier.verify(&unknown).await.unwrap_err();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

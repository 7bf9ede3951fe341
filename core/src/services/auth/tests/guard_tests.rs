//! Tests for the request authenticator

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::services::auth::{extract_bearer_token, AuthRejection, RequestAuthenticator};
use crate::services::revocation::{MockRevocationCache, RevocationCache};
use crate::services::token::TokenService;

fn setup() -> (RequestAuthenticator, Arc<TokenService>, Arc<MockRevocationCache>) {
    let tokens = Arc::new(TokenService::new(b"12345678901234567890123456789012").unwrap());
    let revocation = Arc::new(MockRevocationCache::new());
    (
        RequestAuthenticator::new(tokens.clone(), revocation.clone()),
        tokens,
        revocation,
    )
}

#[test]
fn test_extract_bearer_token() {
    assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
    assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
    assert_eq!(extract_bearer_token("BEARER   abc"), Some("abc"));
    assert_eq!(extract_bearer_token("Basic abc"), None);
    assert_eq!(extract_bearer_token("Bearer"), None);
    assert_eq!(extract_bearer_token("Bearer abc def"), None);
}

#[tokio::test]
async fn test_missing_and_malformed_header() {
    let (auth, _, _) = setup();

    assert_eq!(auth.authenticate(None).await, Err(AuthRejection::MissingHeader));
    assert_eq!(auth.authenticate(Some("  ")).await, Err(AuthRejection::MissingHeader));
    assert_eq!(
        auth.authenticate(Some("Token abc")).await,
        Err(AuthRejection::MalformedHeader)
    );
}

#[tokio::test]
async fn test_valid_token_yields_payload() {
    let (auth, tokens, _) = setup();
    let (token, payload) = tokens.create(Duration::hours(1), 7).unwrap();

    let header = format!("Bearer {}", token);
    assert_eq!(auth.authenticate(Some(&header)).await, Ok(payload));
}

#[tokio::test]
async fn test_expired_and_invalid_tokens() {
    let (auth, tokens, _) = setup();
    let (expired, _) = tokens
        .create_at(Duration::minutes(1), 7, Utc::now() - Duration::minutes(5))
        .unwrap();

    let header = format!("Bearer {}", expired);
    assert_eq!(auth.authenticate(Some(&header)).await, Err(AuthRejection::ExpiredToken));
    assert_eq!(
        auth.authenticate(Some("Bearer v1.local.garbage")).await,
        Err(AuthRejection::InvalidToken)
    );
}

#[tokio::test]
async fn test_revoked_token_rejected() {
    let (auth, tokens, revocation) = setup();
    let (token, payload) = tokens.create(Duration::hours(1), 7).unwrap();
    revocation
        .blacklist(&payload.id.to_string(), std::time::Duration::from_secs(3600))
        .await
        .unwrap();

    let header = format!("Bearer {}", token);
    assert_eq!(auth.authenticate(Some(&header)).await, Err(AuthRejection::Revoked));
}

#[tokio::test]
async fn test_cache_failure_rejects() {
    let (auth, tokens, revocation) = setup();
    let (token, _) = tokens.create(Duration::hours(1), 7).unwrap();
    revocation.set_unavailable(true);

    let header = format!("Bearer {}", token);
    assert_eq!(auth.authenticate(Some(&header)).await, Err(AuthRejection::Revoked));
}

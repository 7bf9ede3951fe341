//! Integration tests for the bearer token middleware

mod common;

use actix_web::{http::StatusCode, test};
use chrono::{Duration, Utc};
use common::{bearer, TestState};
use kk_api::create_app;
use serde_json::Value;

#[actix_web::test]
async fn test_missing_header() {
    let ctx = TestState::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authorization header is not provided");
}

#[actix_web::test]
async fn test_malformed_header() {
    let ctx = TestState::new();
    let (_, token) = ctx.logged_in("grace@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    for header in [format!("Token {}", token), token.clone(), format!("Bearer {} extra", token)] {
        let req = test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .insert_header(("Authorization", header))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "invalid authorization header format");
    }
}

#[actix_web::test]
async fn test_scheme_is_case_insensitive() {
    let ctx = TestState::new();
    let (_, token) = ctx.logged_in("grace@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .insert_header(("Authorization", format!("bearer {}", token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_invalid_token() {
    let ctx = TestState::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/reminders")
        .insert_header(bearer("v1.local.bm90LWEtcmVhbC10b2tlbg"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "token is invalid");
}

#[actix_web::test]
async fn test_expired_token() {
    let ctx = TestState::new();
    let id = ctx.verified_user("grace@example.com").await;
    let (token, _) = ctx
        .tokens
        .create_at(Duration::minutes(15), id, Utc::now() - Duration::hours(1))
        .unwrap();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "token has expired");
}

#[actix_web::test]
async fn test_revocation_cache_outage_rejects() {
    let ctx = TestState::new();
    let (id, token) = ctx.logged_in("grace@example.com").await;
    ctx.revocation.set_unavailable(true);
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", id))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid token");
}

#[actix_web::test]
async fn test_rejections_vary_on_authorization() {
    let ctx = TestState::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/reminders").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let vary = resp.headers().get("Vary").unwrap().to_str().unwrap();
    assert!(vary.contains("Authorization"));
}

#[actix_web::test]
async fn test_public_routes_need_no_token() {
    let ctx = TestState::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/healthcheck").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

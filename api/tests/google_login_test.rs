//! Integration tests for Google sign-in

mod common;

use actix_web::{http::StatusCode, test};
use common::{TestState, GOOGLE_STATE};
use kk_api::create_app;
use serde_json::Value;

#[actix_web::test]
async fn test_google_not_configured() {
    let ctx = TestState::new();
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/google/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "google sign-in not found");
}

#[actix_web::test]
async fn test_google_login_redirects_with_state() {
    let ctx = TestState::with_google("grace@example.com");
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get().uri("/api/v1/auth/google/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.contains(&format!("state={}", GOOGLE_STATE)));
}

#[actix_web::test]
async fn test_callback_rejects_state_mismatch() {
    let ctx = TestState::with_google("grace@example.com");
    ctx.verified_user("grace@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/auth/google/callback?state=forged&code=good-code")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid state value");
}

#[actix_web::test]
async fn test_callback_rejects_bad_code() {
    let ctx = TestState::with_google("grace@example.com");
    ctx.verified_user("grace@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/auth/google/callback?state={}&code=stale", GOOGLE_STATE))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_callback_logs_in_existing_user() {
    let ctx = TestState::with_google("grace@example.com");
    let id = ctx.verified_user("grace@example.com").await;
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/auth/google/callback?state={}&code=good-code", GOOGLE_STATE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["user"]["user_id"], id);
    assert!(body["data"]["access_token"].as_str().unwrap().starts_with("v1.local."));
}

#[actix_web::test]
async fn test_callback_unknown_email() {
    let ctx = TestState::with_google("nobody@example.com");
    let app = test::init_service(create_app(ctx.state.clone())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/auth/google/callback?state={}&code=good-code", GOOGLE_STATE))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "user not found");
}

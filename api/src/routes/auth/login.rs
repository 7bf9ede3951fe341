use actix_web::{web, HttpRequest, HttpResponse};
use kk_core::services::auth::LoginOutcome;
use kk_shared::DataEnvelope;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{LoginRequest, LoginResponse, UserResponse};
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for GET /api/v1/auth/login
///
/// # Request Body
///
/// ```json
/// {"email": "grace@example.com", "password": "password123"}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {"data": {"user": {"user_id": 1, "...": "..."}, "access_token": "v1.local...."}}
/// ```
///
/// ## Errors
/// - 404 `user not found`
/// - 403 `email not verified`; a fresh verification email is queued
/// - 403 `user is not activated`
/// - 401 `Invalid login credentials`
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let outcome = state
        .accounts
        .login(&body.email, &body.password, client_info(&req))
        .await?;

    Ok(login_response(outcome))
}

pub(crate) fn login_response(outcome: LoginOutcome) -> HttpResponse {
    HttpResponse::Ok().json(DataEnvelope::new(LoginResponse {
        user: UserResponse::from(&outcome.user),
        access_token: outcome.access_token,
    }))
}

//! Forgotten password flow

use actix_web::{web, HttpRequest, HttpResponse};
use kk_shared::ResultEnvelope;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{ForgotPasswordRequest, ResetPasswordQuery, ResetPasswordRequest};
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for POST /api/v1/forgot_password
///
/// # Request Body
///
/// ```json
/// {"email": "grace@example.com"}
/// ```
pub async fn forgot_password(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    state.accounts.forgot_password(&body.email, client_info(&req)).await?;

    Ok(HttpResponse::Ok().json(ResultEnvelope::new("reset password email sent")))
}

/// Handler for PATCH /api/v1/reset_password?reset_token=..
///
/// # Request Body
///
/// ```json
/// {"new_password": "password123", "confirm_new_password": "password123"}
/// ```
pub async fn reset_password(
    state: web::Data<AppState>,
    query: web::Query<ResetPasswordQuery>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let token = query
        .token()
        .ok_or_else(|| ApiError::bad_request("reset_token: must be provided"))?;

    state.accounts.reset_password(token, &body.new_password).await?;

    Ok(HttpResponse::Ok().json(ResultEnvelope::new("password updated successfully")))
}

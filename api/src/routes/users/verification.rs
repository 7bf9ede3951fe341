use actix_web::{web, HttpRequest, HttpResponse};
use kk_shared::ResultEnvelope;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{ResendVerificationQuery, VerifyEmailQuery};
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for PATCH /api/v1/verify_email?email=..&secret_code=..
///
/// The secret code is single use. Once the account is verified the code is
/// revoked for the rest of its lifetime.
pub async fn verify_email(
    state: web::Data<AppState>,
    query: web::Query<VerifyEmailQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    state.accounts.verify_email(&query.email, &query.secret_code).await?;

    Ok(HttpResponse::Ok().json(ResultEnvelope::new("user verified successfully")))
}

/// Handler for POST /api/v1/resend_email_verification?user_id=..
pub async fn resend_verification(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ResendVerificationQuery>,
) -> Result<HttpResponse, ApiError> {
    state
        .accounts
        .resend_verification(query.user_id, client_info(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ResultEnvelope::new("new verify email sent")))
}

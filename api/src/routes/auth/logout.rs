use actix_web::{web, HttpResponse};
use kk_shared::ResultEnvelope;

use crate::app::AppState;
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the presented token until it would have expired anyway.
///
/// # Response
///
/// ```json
/// {"result": "Logged out user successfully"}
/// ```
pub async fn logout(auth: AuthContext, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.accounts.logout(auth.payload()).await?;
    Ok(HttpResponse::Ok().json(ResultEnvelope::new("Logged out user successfully")))
}

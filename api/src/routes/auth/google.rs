use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse};
use kk_core::errors::DomainError;
use kk_core::services::auth::OAuthLogin;

use super::login::login_response;
use crate::app::AppState;
use crate::dto::GoogleCallbackQuery;
use crate::handlers::ApiError;
use crate::routes::client_info;

fn google(state: &AppState) -> Result<&OAuthLogin, ApiError> {
    state
        .oauth
        .as_deref()
        .ok_or_else(|| ApiError(DomainError::not_found("google sign-in")))
}

/// Handler for GET /api/v1/auth/google/login
///
/// Redirects (307) to the Google consent screen.
pub async fn google_login(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let url = google(&state)?.authorize_url();
    Ok(HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, url))
        .finish())
}

/// Handler for GET /api/v1/auth/google/callback?state=..&code=..
///
/// Responds like a password login for the account matching the Google email.
pub async fn google_callback(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<GoogleCallbackQuery>,
) -> Result<HttpResponse, ApiError> {
    let profile = google(&state)?.profile(&query.state, &query.code).await?;

    let outcome = state
        .accounts
        .login_with_profile(&profile.email, client_info(&req))
        .await?;

    Ok(login_response(outcome))
}

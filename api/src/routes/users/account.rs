use actix_web::{web, HttpResponse};
use kk_shared::{DataEnvelope, ResultEnvelope};
use validator::Validate;

use crate::app::AppState;
use crate::dto::{ChangePasswordRequest, DeactivateRequest, UserBody, UserResponse};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/users/{id}
///
/// # Response
///
/// ```json
/// {
///     "data": {
///         "user": {
///             "user_id": 1,
///             "first_name": "Grace",
///             "last_name": "Hopper",
///             "email": "grace@example.com",
///             "profile_image_url": null,
///             "created_at": "2024-01-01T00:00:00Z",
///             "password_changed_at": "2024-01-01T00:00:00Z",
///             "is_active": true,
///             "is_email_verified": true
///         }
///     }
/// }
/// ```
pub async fn get_user(
    auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user = state.accounts.get_user(auth.payload(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(DataEnvelope::new(UserBody {
        user: UserResponse::from(&user),
    })))
}

/// Handler for PATCH /api/v1/users/{id}/deactivate
///
/// The token used for this request is revoked along with the account.
pub async fn deactivate(
    auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<DeactivateRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    state
        .accounts
        .deactivate(auth.payload(), path.into_inner(), &body.email, &body.password)
        .await?;

    Ok(HttpResponse::Ok().json(ResultEnvelope::new("user successfully deleted")))
}

/// Handler for PATCH /api/v1/users/{id}/change_password
pub async fn change_password(
    auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let user = state
        .accounts
        .change_password(
            auth.payload(),
            path.into_inner(),
            &body.current_password,
            &body.new_password,
        )
        .await?;

    Ok(HttpResponse::Ok().json(DataEnvelope::new(UserBody {
        user: UserResponse::from(&user),
    })))
}

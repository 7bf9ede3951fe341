use actix_web::{web, HttpRequest, HttpResponse};
use kk_core::services::auth::RegisterUser;
use kk_shared::ResultEnvelope;
use validator::Validate;

use crate::app::AppState;
use crate::dto::RegisterRequest;
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for POST /api/v1/users
///
/// Creates an unverified account and queues its verification email.
///
/// # Request Body
///
/// ```json
/// {
///     "first_name": "Grace",
///     "last_name": "Hopper",
///     "email": "grace@example.com",
///     "password": "password123",
///     "profile_image_url": null
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {"result": "new user created successfully"}
/// ```
///
/// ## Errors
/// - 400 when the body fails validation
/// - 403 `user already exist` for a taken email
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let body = body.into_inner();

    state
        .accounts
        .register(
            RegisterUser {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                password: body.password,
                profile_image_url: body.profile_image_url,
            },
            client_info(&req),
        )
        .await?;

    Ok(HttpResponse::Created().json(ResultEnvelope::new("new user created successfully")))
}

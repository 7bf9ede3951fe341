//! Password rotation reminders of the authenticated user

use actix_web::{web, HttpResponse};
use kk_core::domain::entities::ListRemindersQuery;
use kk_shared::DataEnvelope;
use validator::Validate;

use crate::app::AppState;
use crate::dto::{CreateReminderRequest, ListRemindersParams, ReminderBody, ReminderListBody};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/reminders
///
/// # Request Body
///
/// ```json
/// {"website_url": "https://github.com", "interval": "3 months"}
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// {
///     "data": {
///         "reminder": {
///             "id": 1,
///             "user_id": 1,
///             "website_url": "https://github.com",
///             "interval": "3 months",
///             "updated_at": "2024-01-01T00:00:00Z",
///             "extension": {"get_email_notifications": false}
///         }
///     }
/// }
/// ```
pub async fn create_reminder(
    auth: AuthContext,
    state: web::Data<AppState>,
    body: web::Json<CreateReminderRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let reminder = state
        .reminders
        .create(auth.user_id(), &body.website_url, &body.interval)
        .await?;

    Ok(HttpResponse::Created().json(DataEnvelope::new(ReminderBody { reminder })))
}

/// Handler for GET /api/v1/reminders/{id}
pub async fn get_reminder(
    auth: AuthContext,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let reminder = state.reminders.get(auth.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope::new(ReminderBody { reminder })))
}

/// Handler for GET /api/v1/reminders?website_url=..&page=..&page_size=..&sort=..
pub async fn list_reminders(
    auth: AuthContext,
    state: web::Data<AppState>,
    params: web::Query<ListRemindersParams>,
) -> Result<HttpResponse, ApiError> {
    let query = ListRemindersQuery::from(params.into_inner());
    let (reminders, metadata) = state.reminders.list(auth.user_id(), &query).await?;

    Ok(HttpResponse::Ok().json(DataEnvelope::new(ReminderListBody { reminders, metadata })))
}

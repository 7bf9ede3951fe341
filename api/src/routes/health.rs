use actix_web::{web, HttpResponse};
use kk_shared::types::HealthResponse;
use kk_shared::DataEnvelope;

use crate::app::AppState;

/// Handler for GET /api/v1/healthcheck
///
/// # Response
///
/// ```json
/// {"data": {"status": "available", "environment": "development", "version": "0.1.0"}}
/// ```
pub async fn healthcheck(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(DataEnvelope::new(HealthResponse {
        status: String::from("available"),
        environment: state.environment.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

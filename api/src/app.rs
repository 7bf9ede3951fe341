//! Application state and factory
//!
//! [`AppState`] holds the services shared by every worker. [`create_app`]
//! mounts the routes under `/api/v1` and wraps the protected ones with the
//! bearer token middleware.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use kk_core::services::auth::{AccountService, OAuthLogin, RequestAuthenticator};
use kk_core::services::ReminderService;
use kk_shared::config::{CorsConfig, Environment};
use kk_shared::ErrorEnvelope;
use tracing_actix_web::TracingLogger;

use crate::handlers::{json_config, query_config};
use crate::middleware::{create_cors, RequireAuth};
use crate::routes::{auth, health, password, reminders, users};

/// Services and settings shared by all request handlers
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub reminders: Arc<ReminderService>,
    pub authenticator: RequestAuthenticator,
    /// `None` when Google sign-in is not configured
    pub oauth: Option<Arc<OAuthLogin>>,
    pub environment: Environment,
    pub cors: CorsConfig,
}

/// Create the application with all routes and middleware
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let cors = create_cors(&state.cors, state.environment);
    let require_auth = RequireAuth::new(state.authenticator.clone());

    App::new()
        .app_data(state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(cors)
        .wrap(TracingLogger::default())
        .service(
            web::scope("/api/v1")
                .route("/healthcheck", web::get().to(health::healthcheck))
                // Accounts
                .route("/users", web::post().to(users::register))
                .route("/verify_email", web::patch().to(users::verify_email))
                .route("/resend_email_verification", web::post().to(users::resend_verification))
                .service(
                    web::resource("/users/{id}")
                        .wrap(require_auth.clone())
                        .route(web::get().to(users::get_user)),
                )
                .service(
                    web::resource("/users/{id}/deactivate")
                        .wrap(require_auth.clone())
                        .route(web::patch().to(users::deactivate)),
                )
                .service(
                    web::resource("/users/{id}/change_password")
                        .wrap(require_auth.clone())
                        .route(web::patch().to(users::change_password)),
                )
                // Passwords
                .route("/forgot_password", web::post().to(password::forgot_password))
                .route("/reset_password", web::patch().to(password::reset_password))
                // Sessions
                .service(
                    web::scope("/auth")
                        .service(
                            web::resource("/login")
                                .route(web::get().to(auth::login))
                                .route(web::post().to(auth::login)),
                        )
                        .route("/google/login", web::get().to(auth::google_login))
                        .route("/google/callback", web::get().to(auth::google_callback))
                        .service(
                            web::resource("/logout")
                                .wrap(require_auth.clone())
                                .route(web::post().to(auth::logout)),
                        ),
                )
                // Reminders
                .service(
                    web::scope("/reminders")
                        .wrap(require_auth)
                        .route("", web::post().to(reminders::create_reminder))
                        .route("", web::get().to(reminders::list_reminders))
                        .route("/{id}", web::get().to(reminders::get_reminder)),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorEnvelope::new("the requested resource could not be found"))
}

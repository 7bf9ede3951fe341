//! CORS configuration for browser clients.
//!
//! Development accepts any origin. Every other environment only accepts the
//! origins listed in `CORS_TRUSTED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use kk_shared::config::{CorsConfig, Environment};

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS middleware for `environment`
pub fn create_cors(config: &CorsConfig, environment: Environment) -> Cors {
    let allowed_headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if environment.is_development() {
        tracing::debug!("Configuring permissive CORS for development");
        return Cors::default()
            .allow_any_origin()
            .allowed_methods(ALLOWED_METHODS)
            .allowed_headers(allowed_headers)
            .max_age(config.max_age);
    }

    let cors = config
        .trusted_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    tracing::info!(origins = config.trusted_origins.len(), "Configuring CORS for trusted origins");
    cors.allowed_methods(ALLOWED_METHODS)
        .allowed_headers(allowed_headers)
        .max_age(config.max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    fn config() -> CorsConfig {
        CorsConfig {
            trusted_origins: vec!["https://app.keykeeper.dev".to_string()],
            max_age: 3600,
        }
    }

    #[actix_web::test]
    async fn test_trusted_origin_allowed_in_production() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config(), Environment::Production))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.keykeeper.dev"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.keykeeper.dev"
        );
    }

    #[actix_web::test]
    async fn test_unknown_origin_rejected_in_production() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&config(), Environment::Production))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example"))
            .to_request();
        let resp = test::try_call_service(&app, req).await;
        match resp {
            Ok(resp) => assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none()),
            Err(err) => assert_eq!(err.as_response_error().status_code(), StatusCode::BAD_REQUEST),
        }
    }

    #[actix_web::test]
    async fn test_any_origin_in_development() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&CorsConfig::default(), Environment::Development))
                .route("/", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:3000"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_some());
    }
}

//! Error handling shared by all routes

pub mod error;

pub use error::{validation_summary, ApiError};

use actix_web::{error::JsonPayloadError, error::QueryPayloadError, web, HttpRequest};

/// Body extractor config answering malformed JSON with `{"error": ...}`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        ApiError::bad_request(format!("body contains badly-formed JSON: {}", err)).into()
    })
}

/// Query string extractor config with the same error shape
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        ApiError::bad_request(format!("invalid query string: {}", err)).into()
    })
}

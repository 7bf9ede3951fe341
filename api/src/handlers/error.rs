//! Mapping of domain errors onto HTTP responses
//!
//! Every error body has the shape `{"error": "<message>"}`. Dependency and
//! invariant failures are logged in full and answered with a generic
//! message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use kk_core::errors::{DomainError, TokenError};
use kk_shared::validation::FieldErrors;
use kk_shared::ErrorEnvelope;
use validator::ValidationErrors;

const INTERNAL_MESSAGE: &str = "the server encountered a problem and could not process your request";

/// Error returned by request handlers
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub DomainError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(DomainError::validation(message))
    }

    /// Message safe to show the client
    pub fn client_message(&self) -> String {
        match &self.0 {
            DomainError::Validation { message }
            | DomainError::Conflict { message }
            | DomainError::Unauthorized { message }
            | DomainError::Forbidden { message } => message.clone(),
            DomainError::NotFound { resource } => format!("{} not found", resource),
            DomainError::Token(TokenError::KeyConfiguration { .. } | TokenError::DurationOutOfRange)
            | DomainError::Dependency { .. }
            | DomainError::InternalInvariant { .. } => INTERNAL_MESSAGE.to_string(),
            DomainError::Token(err) => err.to_string(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(validation_summary(&errors))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::Token(TokenError::KeyConfiguration { .. } | TokenError::DurationOutOfRange) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DomainError::Token(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden { .. } | DomainError::Conflict { .. } => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Dependency { .. } | DomainError::InternalInvariant { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        HttpResponse::build(status).json(ErrorEnvelope::new(self.client_message()))
    }
}

/// Flatten validator output into `field: message; field: message`
///
/// Fields are sorted so the message is stable across runs.
pub fn validation_summary(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    let mut problems = FieldErrors::new();
    for (field, field_errors) in fields {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            problems.add(field, message);
        }
    }
    problems.summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::Token(TokenError::Expired), StatusCode::BAD_REQUEST),
            (DomainError::unauthorized("mismatched user"), StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("email not verified"), StatusCode::FORBIDDEN),
            (DomainError::conflict("user already exist"), StatusCode::FORBIDDEN),
            (DomainError::not_found("user"), StatusCode::NOT_FOUND),
            (DomainError::dependency("redis down"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                DomainError::Token(TokenError::KeyConfiguration { expected: 32, actual: 3 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (DomainError::Token(TokenError::DurationOutOfRange), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code(), status);
        }
    }

    #[actix_web::test]
    async fn test_internal_detail_is_hidden() {
        let response = ApiError(DomainError::dependency("connection refused at 10.0.0.3")).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ApiError(DomainError::not_found("user")).client_message(), "user not found");
    }
}

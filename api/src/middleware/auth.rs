//! Bearer token middleware for protected endpoints.
//!
//! The middleware reads the Authorization header, verifies the session
//! token, checks the revocation cache and stores the token payload in the
//! request extensions. Handlers read it back through [`AuthContext`].

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderValue, AUTHORIZATION, VARY},
        StatusCode,
    },
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use kk_core::domain::entities::TokenPayload;
use kk_core::errors::DomainError;
use kk_core::services::auth::{AuthRejection, RequestAuthenticator};
use kk_shared::ErrorEnvelope;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use crate::handlers::ApiError;

/// Authenticated caller, available to handlers behind [`RequireAuth`]
#[derive(Debug, Clone)]
pub struct AuthContext(pub TokenPayload);

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }

    pub fn payload(&self) -> &TokenPayload {
        &self.0
    }
}

impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let payload = req.extensions().get::<TokenPayload>().cloned();
        ready(payload.map(AuthContext).ok_or_else(|| {
            ApiError(DomainError::internal("auth context requested on an unprotected route"))
        }))
    }
}

/// Refusal produced by the middleware
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AuthError(#[from] pub AuthRejection);

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AuthRejection::MissingHeader | AuthRejection::MalformedHeader | AuthRejection::Revoked => {
                StatusCode::UNAUTHORIZED
            }
            AuthRejection::ExpiredToken | AuthRejection::InvalidToken => StatusCode::BAD_REQUEST,
            AuthRejection::VerificationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((VARY, HeaderValue::from_static("Authorization")))
            .json(ErrorEnvelope::new(self.0.to_string()))
    }
}

/// Middleware factory guarding a scope or route
#[derive(Clone)]
pub struct RequireAuth {
    authenticator: RequestAuthenticator,
}

impl RequireAuth {
    pub fn new(authenticator: RequestAuthenticator) -> Self {
        Self { authenticator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service: Rc::new(service),
            authenticator: self.authenticator.clone(),
        }))
    }
}

pub struct RequireAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: RequestAuthenticator,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authenticator = self.authenticator.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get(AUTHORIZATION)
                .map(|value| match value.to_str() {
                    Ok(value) => value.to_string(),
                    // Opaque bytes can never form `Bearer <token>`
                    Err(_) => String::from("?"),
                });

            let payload = match authenticator.authenticate(header.as_deref()).await {
                Ok(payload) => payload,
                Err(rejection) => {
                    let response = AuthError(rejection).error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };
            req.extensions_mut().insert(payload);

            let mut response = service.call(req).await?;
            response
                .headers_mut()
                .append(VARY, HeaderValue::from_static("Authorization"));
            Ok(response.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use chrono::{Duration, Utc};

    #[actix_web::test]
    async fn test_auth_context_from_extensions() {
        let req = test::TestRequest::default().to_http_request();
        let payload = TokenPayload::new(7, Duration::minutes(5), Utc::now()).unwrap();
        req.extensions_mut().insert(payload.clone());

        let ctx = AuthContext::extract(&req).await.unwrap();
        assert_eq!(ctx.user_id(), 7);
        assert_eq!(ctx.payload().id, payload.id);
    }

    #[actix_web::test]
    async fn test_auth_context_missing_is_internal_error() {
        let req = test::TestRequest::default().to_http_request();
        let err = AuthContext::extract(&req).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[::core::prelude::v1::test]
    fn test_rejection_status_codes() {
        assert_eq!(AuthError(AuthRejection::MissingHeader).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError(AuthRejection::MalformedHeader).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError(AuthRejection::Revoked).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError(AuthRejection::ExpiredToken).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError(AuthRejection::InvalidToken).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError(AuthRejection::VerificationFailed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

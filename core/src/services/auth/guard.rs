//! Bearer token authentication of incoming requests

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use crate::domain::entities::TokenPayload;
use crate::errors::TokenError;
use crate::services::revocation::RevocationCache;
use crate::services::token::TokenService;

/// Why a request was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("authorization header is not provided")]
    MissingHeader,

    #[error("invalid authorization header format")]
    MalformedHeader,

    #[error("token has expired")]
    ExpiredToken,

    #[error("token is invalid")]
    InvalidToken,

    /// Token verification failed for a reason other than the token itself
    #[error("failed to verify token")]
    VerificationFailed,

    #[error("invalid token")]
    Revoked,
}

impl From<TokenError> for AuthRejection {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthRejection::ExpiredToken,
            TokenError::Invalid => AuthRejection::InvalidToken,
            TokenError::KeyConfiguration { .. } | TokenError::DurationOutOfRange => {
                AuthRejection::VerificationFailed
            }
        }
    }
}

/// Extract the token from `Bearer <token>`
///
/// The header must split into exactly two whitespace separated fields and
/// the scheme is matched case-insensitively.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let mut fields = header.split_whitespace();
    let scheme = fields.next()?;
    let token = fields.next()?;
    if fields.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}

/// Header check, token verification and revocation lookup for one request
#[derive(Clone)]
pub struct RequestAuthenticator {
    tokens: Arc<TokenService>,
    revocation: Arc<dyn RevocationCache>,
}

impl RequestAuthenticator {
    pub fn new(tokens: Arc<TokenService>, revocation: Arc<dyn RevocationCache>) -> Self {
        Self { tokens, revocation }
    }

    /// Authenticate the value of the `Authorization` header
    ///
    /// A revocation cache failure rejects the request as if the token were
    /// revoked.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<TokenPayload, AuthRejection> {
        let header = header
            .filter(|h| !h.trim().is_empty())
            .ok_or(AuthRejection::MissingHeader)?;
        let token = extract_bearer_token(header).ok_or(AuthRejection::MalformedHeader)?;

        let payload = self.tokens.verify(token).map_err(|e| {
            if let TokenError::KeyConfiguration { .. } = e {
                error!(error = %e, "token verification misconfigured");
            }
            AuthRejection::from(e)
        })?;

        match self.revocation.is_blacklisted(&payload.id.to_string()).await {
            Ok(false) => Ok(payload),
            Ok(true) => Err(AuthRejection::Revoked),
            Err(e) => {
                warn!(error = %e, user_id = payload.user_id, "revocation lookup failed");
                Err(AuthRejection::Revoked)
            }
        }
    }
}

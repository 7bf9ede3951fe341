//! Third-party sign-in

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Profile returned by the provider's userinfo endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, rename = "verified_email")]
    pub email_verified: bool,
}

/// An OAuth2 authorization-code provider
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent page URL carrying `state`
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the signed-in user's profile
    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, DomainError>;
}

/// Binds a provider to the state value expected back on the callback
#[derive(Clone)]
pub struct OAuthLogin {
    provider: Arc<dyn OAuthProvider>,
    expected_state: String,
}

impl OAuthLogin {
    pub fn new(provider: Arc<dyn OAuthProvider>, expected_state: impl Into<String>) -> Self {
        Self {
            provider,
            expected_state: expected_state.into(),
        }
    }

    pub fn authorize_url(&self) -> String {
        self.provider.authorize_url(&self.expected_state)
    }

    /// Check the callback state, then exchange the code
    pub async fn profile(&self, state: &str, code: &str) -> Result<OAuthProfile, DomainError> {
        if self.expected_state.is_empty()
            || !constant_time_eq::constant_time_eq(state.as_bytes(), self.expected_state.as_bytes())
        {
            return Err(DomainError::unauthorized("invalid state value"));
        }
        if code.is_empty() {
            return Err(DomainError::validation("authorization code must be provided"));
        }
        self.provider.exchange_code(code).await
    }
}

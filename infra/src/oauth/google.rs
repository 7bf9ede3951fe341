//! Google OAuth2 authorization-code client

use std::time::Duration;

use async_trait::async_trait;
use kk_core::errors::DomainError;
use kk_core::services::auth::{OAuthProfile, OAuthProvider};
use kk_shared::OAuthConfig;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{error, warn};

use crate::InfrastructureError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

pub struct GoogleOAuthProvider {
    http: Client,
    config: OAuthConfig,
    auth_url: Url,
}

impl GoogleOAuthProvider {
    pub fn new(config: OAuthConfig) -> Result<Self, InfrastructureError> {
        let auth_url = Url::parse(&config.auth_url)
            .map_err(|e| InfrastructureError::Config(format!("invalid OAuth auth URL: {}", e)))?;
        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http,
            config,
            auth_url,
        })
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, DomainError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(InfrastructureError::from)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "OAuth code exchange rejected");
            return Err(DomainError::dependency("failed to exchange code"));
        }
        let token: TokenResponse = response.json().await.map_err(InfrastructureError::from)?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthProfile, DomainError> {
        let access_token = self.fetch_access_token(code).await?;

        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfrastructureError::from)?;
        if !response.status().is_success() {
            error!(status = %response.status(), "failed to get user info");
            return Err(DomainError::dependency("failed to get user info"));
        }

        let profile: OAuthProfile = response.json().await.map_err(InfrastructureError::from)?;
        if profile.email.is_empty() {
            return Err(DomainError::dependency("user info has no email"));
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GoogleOAuthProvider {
        let lookup = |key: &str| match key {
            "GOOGLE_CLIENT_ID" => Some("client-id".to_string()),
            "GOOGLE_CLIENT_SECRET" => Some("client-secret".to_string()),
            "GOOGLE_REDIRECT_URL" => Some("http://localhost:8080/api/v1/auth/google/callback".to_string()),
            "GOOGLE_RANDOM_STRING" => Some("random".to_string()),
            _ => None,
        };
        GoogleOAuthProvider::new(OAuthConfig::from_source(&lookup)).unwrap()
    }

    #[test]
    fn test_authorize_url_carries_state_and_scopes() {
        let url = Url::parse(&provider().authorize_url("random")).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["state"], "random");
        assert_eq!(pairs["client_id"], "client-id");
        assert_eq!(pairs["response_type"], "code");
        assert!(pairs["scope"].contains("userinfo.email"));
        assert_eq!(pairs["redirect_uri"], "http://localhost:8080/api/v1/auth/google/callback");
    }

    #[test]
    fn test_profile_decodes_google_fields() {
        let profile: OAuthProfile = serde_json::from_str(
            r#"{"id":"1","email":"ada@example.com","verified_email":true,"name":"Ada Lovelace","given_name":"Ada","family_name":"Lovelace","picture":"x"}"#,
        )
        .unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert!(profile.email_verified);
        assert_eq!(profile.family_name, "Lovelace");
    }
}

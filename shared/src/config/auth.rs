//! Authentication configuration: token secret, lifetimes and OAuth

use std::time::Duration;

use super::{duration_or, or_default, required, EnvSource};
use crate::errors::ConfigError;

/// Upper bound for token lifetimes, ten years
pub const MAX_TOKEN_DURATION: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

fn token_duration_or(source: EnvSource<'_>, key: &str, default: Duration) -> Result<Duration, ConfigError> {
    let duration = duration_or(source, key, default)?;
    if duration > MAX_TOKEN_DURATION {
        return Err(ConfigError::invalid(key, "must not exceed 87600h"));
    }
    Ok(duration)
}

/// Token service configuration
#[derive(Clone)]
pub struct TokenConfig {
    /// Process-wide symmetric key; must be exactly 32 bytes
    pub symmetric_key: String,

    /// Lifetime of login tokens
    pub session_duration: Duration,

    /// Lifetime of tokens embedded in verify-email and reset-password links
    pub email_link_duration: Duration,

    /// Extra time a revocation entry outlives the token's own expiry, to
    /// cover clock skew between nodes (zero by default)
    pub revocation_skew_allowance: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("symmetric_key", &"<redacted>")
            .field("session_duration", &self.session_duration)
            .field("email_link_duration", &self.email_link_duration)
            .field("revocation_skew_allowance", &self.revocation_skew_allowance)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(symmetric_key: impl Into<String>) -> Self {
        Self {
            symmetric_key: symmetric_key.into(),
            session_duration: Duration::from_secs(24 * 3600),
            email_link_duration: Duration::from_secs(25 * 60),
            revocation_skew_allowance: Duration::ZERO,
        }
    }

    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::new(required(source, "TOKEN_SYMMETRIC_KEY")?);
        Ok(Self {
            session_duration: token_duration_or(source, "SESSION_TOKEN_DURATION", defaults.session_duration)?,
            email_link_duration: token_duration_or(
                source,
                "EMAIL_LINK_TOKEN_DURATION",
                defaults.email_link_duration,
            )?,
            revocation_skew_allowance: duration_or(
                source,
                "REVOCATION_SKEW_ALLOWANCE",
                defaults.revocation_skew_allowance,
            )?,
            ..defaults
        })
    }
}

/// Google OAuth2 client configuration
#[derive(Clone, Default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    /// Value sent as `state` and expected back on the callback
    pub state: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .finish_non_exhaustive()
    }
}

impl OAuthConfig {
    pub fn from_source(source: EnvSource<'_>) -> Self {
        Self {
            client_id: or_default(source, "GOOGLE_CLIENT_ID", ""),
            client_secret: or_default(source, "GOOGLE_CLIENT_SECRET", ""),
            redirect_url: or_default(source, "GOOGLE_REDIRECT_URL", ""),
            state: or_default(source, "GOOGLE_RANDOM_STRING", ""),
            auth_url: String::from("https://accounts.google.com/o/oauth2/auth"),
            token_url: String::from("https://oauth2.googleapis.com/token"),
            userinfo_url: String::from("https://www.googleapis.com/oauth2/v2/userinfo"),
            scopes: vec![
                String::from("https://www.googleapis.com/auth/userinfo.email"),
                String::from("https://www.googleapis.com/auth/userinfo.profile"),
            ],
        }
    }

    /// Whether Google sign-in is usable
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.state.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_defaults() {
        let config = TokenConfig::new("k");
        assert_eq!(config.session_duration, Duration::from_secs(86_400));
        assert_eq!(config.email_link_duration, Duration::from_secs(1_500));
        assert!(!format!("{:?}", config).contains("\"k\""));
    }

    #[test]
    fn test_token_durations_are_capped() {
        let lookup = |key: &str| match key {
            "TOKEN_SYMMETRIC_KEY" => Some("12345678901234567890123456789012".to_string()),
            "SESSION_TOKEN_DURATION" => Some("3000000000h".to_string()),
            _ => None,
        };
        let err = TokenConfig::from_source(&lookup).unwrap_err();
        assert_eq!(err.variable(), "SESSION_TOKEN_DURATION");

        let lookup = |key: &str| match key {
            "TOKEN_SYMMETRIC_KEY" => Some("12345678901234567890123456789012".to_string()),
            "EMAIL_LINK_TOKEN_DURATION" => Some("87600h".to_string()),
            _ => None,
        };
        let config = TokenConfig::from_source(&lookup).unwrap();
        assert_eq!(config.email_link_duration, MAX_TOKEN_DURATION);
    }

    #[test]
    fn test_oauth_config_is_configured() {
        let lookup = |key: &str| match key {
            "GOOGLE_CLIENT_ID" => Some("id".to_string()),
            "GOOGLE_CLIENT_SECRET" => Some("secret".to_string()),
            _ => None,
        };
        let config = OAuthConfig::from_source(&lookup);
        assert!(!config.is_configured());
        assert_eq!(config.scopes.len(), 2);
    }
}

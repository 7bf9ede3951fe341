//! Outbound email configuration

use super::{or_default, parsed_or, required, EnvSource};
use crate::errors::ConfigError;

/// Which mailer implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailerProvider {
    /// Deliver through an SMTP relay
    Smtp,
    /// Write messages to the log only
    Log,
}

impl std::str::FromStr for MailerProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smtp" => Ok(MailerProvider::Smtp),
            "log" | "mock" => Ok(MailerProvider::Log),
            _ => Err(format!("Invalid mailer provider: {}", s)),
        }
    }
}

/// Email sender configuration
#[derive(Clone)]
pub struct MailConfig {
    pub provider: MailerProvider,
    pub sender_name: String,
    pub sender_address: String,
    pub sender_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("provider", &self.provider)
            .field("sender_name", &self.sender_name)
            .field("sender_address", &self.sender_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish_non_exhaustive()
    }
}

impl MailConfig {
    /// Configuration for the log-only mailer
    pub fn log_only() -> Self {
        Self {
            provider: MailerProvider::Log,
            sender_name: String::from("KeyKeeper"),
            sender_address: String::from("noreply@localhost"),
            sender_password: String::new(),
            smtp_host: String::from("smtp.gmail.com"),
            smtp_port: 587,
        }
    }

    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let provider = parsed_or(source, "MAILER_PROVIDER", MailerProvider::Smtp)?;
        let defaults = Self::log_only();
        if provider == MailerProvider::Log {
            return Ok(defaults);
        }

        Ok(Self {
            provider,
            sender_name: required(source, "EMAIL_SENDER_NAME")?,
            sender_address: required(source, "EMAIL_SENDER_ADDRESS")?,
            sender_password: required(source, "EMAIL_SENDER_PASSWORD")?,
            smtp_host: or_default(source, "SMTP_HOST", &defaults.smtp_host),
            smtp_port: parsed_or(source, "SMTP_PORT", defaults.smtp_port)?,
        })
    }

    /// Value for the From header
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_provider_needs_no_credentials() {
        let lookup = |key: &str| (key == "MAILER_PROVIDER").then(|| "log".to_string());
        let config = MailConfig::from_source(&lookup).unwrap();
        assert_eq!(config.provider, MailerProvider::Log);
    }

    #[test]
    fn test_smtp_provider_requires_sender() {
        let lookup = |_: &str| None;
        let err = MailConfig::from_source(&lookup).unwrap_err();
        assert_eq!(err.variable(), "EMAIL_SENDER_NAME");
    }

    #[test]
    fn test_from_header() {
        let config = MailConfig {
            sender_name: "KeyKeeper".to_string(),
            sender_address: "noreply@keykeeper.dev".to_string(),
            ..MailConfig::log_only()
        };
        assert_eq!(config.from_header(), "KeyKeeper <noreply@keykeeper.dev>");
    }
}

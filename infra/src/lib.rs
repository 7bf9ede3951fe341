//! # Infrastructure Layer
//!
//! Concrete implementations of the ports defined in `kk_core`:
//! - **Database**: Postgres repositories for users, sessions and reminders (SQLx)
//! - **Cache**: Redis client and the token revocation cache
//! - **Queue**: Redis task broker backing the background task queue
//! - **Mail**: SMTP mailer (lettre) and a log-only mailer
//! - **OAuth**: Google sign-in client (reqwest)

pub mod cache;
pub mod database;
pub mod mail;
pub mod oauth;
pub mod queue;

use kk_core::errors::DomainError;
use kk_shared::ConfigError;

pub use cache::{RedisClient, RedisRevocationCache};
pub use database::{DatabasePool, PgReminderRepository, PgSessionRepository, PgUserRepository};
pub use mail::{build_mailer, LogMailer, SmtpMailer};
pub use oauth::GoogleOAuthProvider;
pub use queue::RedisTaskBroker;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// SMTP transport or message building error
    #[error("Mail error: {0}")]
    Mail(String),

    /// Stored or received data could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for InfrastructureError {
    fn from(err: ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for InfrastructureError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        InfrastructureError::Mail(err.to_string())
    }
}

impl From<lettre::error::Error> for InfrastructureError {
    fn from(err: lettre::error::Error) -> Self {
        InfrastructureError::Mail(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::dependency(err.to_string())
    }
}

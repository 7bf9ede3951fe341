//! Shared utilities and common types for the KeyKeeper server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Configuration errors
//! - Response envelopes and pagination types
//! - Small validation and duration helpers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CorsConfig, DatabaseConfig, Environment, LoggingConfig, MailConfig,
    MailerProvider, OAuthConfig, ServerConfig, TokenConfig, WorkerConfig,
};
pub use errors::ConfigError;
pub use types::{DataEnvelope, ErrorEnvelope, Filters, PageMetadata, ResultEnvelope};
pub use utils::{duration, validation};

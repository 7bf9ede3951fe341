//! Server configuration module

use std::time::Duration;

use super::{duration_or, or_default, EnvSource};
use crate::errors::ConfigError;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to
    pub address: String,

    /// Public host used when building links in emails
    pub api_host: String,

    /// Bound on graceful shutdown of in-flight requests
    pub shutdown_timeout: Duration,

    /// Worker threads (0 = number of CPU cores)
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: String::from("0.0.0.0:8080"),
            api_host: String::from("localhost:8080"),
            shutdown_timeout: Duration::from_secs(5),
            workers: 0,
        }
    }
}

impl ServerConfig {
    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            address: or_default(source, "SERVER_ADDRESS", &defaults.address),
            api_host: or_default(source, "API_HOST", &defaults.api_host),
            shutdown_timeout: duration_or(source, "SHUTDOWN_TIMEOUT", defaults.shutdown_timeout)?,
            ..defaults
        })
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Origins allowed outside development
    pub trusted_origins: Vec<String>,

    /// Max age for preflight cache in seconds
    pub max_age: usize,
}

impl CorsConfig {
    pub fn from_source(source: EnvSource<'_>) -> Self {
        let trusted_origins = source("CORS_TRUSTED_ORIGINS")
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        Self {
            trusted_origins,
            max_age: 3600,
        }
    }
}

//! Redis settings shared by the revocation cache and the task queue

use std::time::Duration;

use super::{or_default, EnvSource};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub url: String,
    /// Namespace for every key; empty disables prefixing
    pub key_prefix: String,
    /// Attempts per connect or command before the error is surfaced
    pub attempts: u32,
    /// First backoff between attempts, doubled after each failure
    pub backoff: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REDIS_URL)
    }
}

impl CacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: "keykeeper".to_string(),
            attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }

    /// `REDIS_ADDRESS` may be a bare `host:port`
    pub fn from_source(source: EnvSource<'_>) -> Self {
        let address = or_default(source, "REDIS_ADDRESS", DEFAULT_REDIS_URL);
        let url = if address.starts_with("redis://") || address.starts_with("rediss://") {
            address
        } else {
            format!("redis://{}", address)
        };
        Self {
            key_prefix: or_default(source, "REDIS_KEY_PREFIX", "keykeeper"),
            ..Self::new(url)
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn make_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

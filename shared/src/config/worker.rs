//! Background worker configuration

use std::time::Duration;

use super::{duration_or, parsed_or, EnvSource};
use crate::errors::ConfigError;

/// Task processor and cleanup job configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent task workers
    pub concurrency: usize,

    /// Queue names with their relative weights
    pub queues: Vec<(String, u32)>,

    /// Sleep between polls when every queue is empty
    pub poll_interval: Duration,

    /// Interval of the expired session sweep
    pub cleanup_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            queues: vec![(String::from("critical"), 10), (String::from("default"), 5)],
            poll_interval: Duration::from_secs(1),
            cleanup_interval: Duration::from_secs(25 * 60),
        }
    }
}

impl WorkerConfig {
    pub fn from_source(source: EnvSource<'_>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let concurrency = parsed_or(source, "WORKER_CONCURRENCY", defaults.concurrency)?;
        if concurrency == 0 {
            return Err(ConfigError::invalid("WORKER_CONCURRENCY", "must be at least 1"));
        }
        Ok(Self {
            concurrency,
            cleanup_interval: duration_or(source, "SESSION_CLEANUP_INTERVAL", defaults.cleanup_interval)?,
            ..defaults
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.queues[0], ("critical".to_string(), 10));
        assert_eq!(config.queues[1], ("default".to_string(), 5));
        assert_eq!(config.cleanup_interval, Duration::from_secs(1500));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let lookup = |key: &str| (key == "WORKER_CONCURRENCY").then(|| "0".to_string());
        assert!(WorkerConfig::from_source(&lookup).is_err());
    }
}

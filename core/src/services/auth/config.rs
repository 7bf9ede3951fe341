//! Account service configuration

use std::time::Duration;

use chrono::Duration as ChronoDuration;
use kk_shared::TokenConfig;

use crate::services::tasks::{TaskOptions, QUEUE_CRITICAL};

/// Configuration for account workflows
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Lifetime of login tokens
    pub session_duration: ChronoDuration,
    /// Lifetime of reset-password link tokens
    pub email_link_duration: ChronoDuration,
    /// Added to revocation TTLs to cover clock skew
    pub revocation_skew_allowance: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            session_duration: ChronoDuration::hours(24),
            email_link_duration: ChronoDuration::minutes(25),
            revocation_skew_allowance: Duration::ZERO,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl From<&TokenConfig> for AccountServiceConfig {
    fn from(config: &TokenConfig) -> Self {
        let defaults = Self::default();
        Self {
            session_duration: ChronoDuration::from_std(config.session_duration)
                .unwrap_or(defaults.session_duration),
            email_link_duration: ChronoDuration::from_std(config.email_link_duration)
                .unwrap_or(defaults.email_link_duration),
            revocation_skew_allowance: config.revocation_skew_allowance,
            ..defaults
        }
    }
}

/// Enqueue options of the verification email task
pub fn verify_email_task_options() -> TaskOptions {
    TaskOptions::new()
        .max_retry(10)
        .process_in(Duration::from_secs(10))
        .queue(QUEUE_CRITICAL)
}

/// Enqueue options of the reset-password email task
pub fn reset_password_task_options() -> TaskOptions {
    TaskOptions::new()
        .max_retry(10)
        .process_in(Duration::from_secs(5))
        .queue(QUEUE_CRITICAL)
}

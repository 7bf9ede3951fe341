//! Task type names, payloads and enqueue options

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TASK_SEND_VERIFY_EMAIL: &str = "task:send_verify_email";
pub const TASK_SEND_RESET_PASSWORD_EMAIL: &str = "task:send_reset_password_email";

/// Served twice as often as `default`
pub const QUEUE_CRITICAL: &str = "critical";
pub const QUEUE_DEFAULT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSendVerifyEmail {
    pub user_id: i64,
    pub client_ip: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSendResetPasswordEmail {
    #[serde(rename = "payload_id")]
    pub session_id: Uuid,
    pub user_email: String,
}

/// Per-task retry count, delay and queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    pub max_retry: u32,
    pub delay: Duration,
    pub queue: String,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            max_retry: 25,
            delay: Duration::ZERO,
            queue: QUEUE_DEFAULT.to_string(),
        }
    }
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    /// Delay before the task becomes due
    pub fn process_in(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }
}

//! Queued task record

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::TaskOptions;
use crate::errors::TaskError;

/// A task as stored by the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub id: Uuid,
    pub task_type: String,
    /// JSON-encoded payload
    pub payload: String,
    pub queue: String,
    pub max_retry: u32,
    /// Failed attempts so far
    pub retried: u32,
    /// Earliest time the task may run
    pub process_at: DateTime<Utc>,
    pub enqueued_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

impl TaskEnvelope {
    pub fn new(task_type: &str, payload: String, opts: &TaskOptions, now: DateTime<Utc>) -> Self {
        let delay = Duration::from_std(opts.delay).unwrap_or_else(|_| Duration::zero());
        Self {
            id: Uuid::new_v4(),
            task_type: task_type.to_string(),
            payload,
            queue: opts.queue.clone(),
            max_retry: opts.max_retry,
            retried: 0,
            process_at: now + delay,
            enqueued_at: now,
            last_error: None,
        }
    }

    /// Decode the payload; a malformed payload can never succeed on retry
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TaskError> {
        serde_json::from_str(&self.payload)
            .map_err(|e| TaskError::skip_retry(format!("failed to unmarshal payload: {}", e)))
    }

    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.process_at <= now
    }

    pub fn retries_left(&self) -> bool {
        self.retried < self.max_retry
    }
}

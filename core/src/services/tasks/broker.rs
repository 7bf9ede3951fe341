//! Message broker contract backing the task queue

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::envelope::TaskEnvelope;
use crate::errors::DomainError;

/// How long a claimed task stays invisible before it may be reclaimed
pub const DEFAULT_LEASE: Duration = Duration::from_secs(30 * 60);

/// Durable store of named, delayed task queues
///
/// Claiming is exclusive: a task returned by `dequeue` is leased to that
/// caller until it calls `complete`, `retry` or `archive`, or the lease runs
/// out and `recover_expired` puts it back.
#[async_trait]
pub trait TaskBroker: Send + Sync {
    /// Add a task to its queue, due at `task.process_at`
    async fn enqueue(&self, task: TaskEnvelope) -> Result<(), DomainError>;

    /// Claim the earliest due task of `queue`, if any
    async fn dequeue(&self, queue: &str) -> Result<Option<TaskEnvelope>, DomainError>;

    /// Drop a successfully processed task
    async fn complete(&self, task: &TaskEnvelope) -> Result<(), DomainError>;

    /// Put a failed task back, due at `process_at`
    async fn retry(&self, task: TaskEnvelope, process_at: DateTime<Utc>) -> Result<(), DomainError>;

    /// Move a task that will not run again to the archive
    async fn archive(&self, task: TaskEnvelope) -> Result<(), DomainError>;

    /// Requeue tasks whose lease expired; returns how many were recovered
    async fn recover_expired(&self) -> Result<u64, DomainError>;
}

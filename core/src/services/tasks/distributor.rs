//! Producer side of the task queue

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::broker::TaskBroker;
use super::envelope::TaskEnvelope;
use super::payload::{
    PayloadSendResetPasswordEmail, PayloadSendVerifyEmail, TaskOptions, TASK_SEND_RESET_PASSWORD_EMAIL,
    TASK_SEND_VERIFY_EMAIL,
};
use crate::errors::DomainError;

/// Enqueues typed tasks
///
/// Failures are returned to the caller; these tasks are not best effort.
#[async_trait]
pub trait TaskDistributor: Send + Sync {
    async fn distribute_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        opts: TaskOptions,
    ) -> Result<(), DomainError>;

    async fn distribute_send_reset_password_email(
        &self,
        payload: &PayloadSendResetPasswordEmail,
        opts: TaskOptions,
    ) -> Result<(), DomainError>;
}

/// Distributor writing envelopes to a [`TaskBroker`]
#[derive(Clone)]
pub struct BrokerTaskDistributor {
    broker: Arc<dyn TaskBroker>,
}

impl BrokerTaskDistributor {
    pub fn new(broker: Arc<dyn TaskBroker>) -> Self {
        Self { broker }
    }

    async fn distribute<P: Serialize + Sync>(
        &self,
        task_type: &str,
        payload: &P,
        opts: TaskOptions,
    ) -> Result<(), DomainError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| DomainError::internal(format!("failed to marshal task payload: {}", e)))?;
        let task = TaskEnvelope::new(task_type, json, &opts, Utc::now());
        let (id, queue, max_retry) = (task.id, task.queue.clone(), task.max_retry);

        self.broker.enqueue(task).await?;

        info!(
            task_id = %id,
            task_type,
            queue = %queue,
            max_retry,
            "enqueued task"
        );
        Ok(())
    }
}

#[async_trait]
impl TaskDistributor for BrokerTaskDistributor {
    async fn distribute_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        opts: TaskOptions,
    ) -> Result<(), DomainError> {
        self.distribute(TASK_SEND_VERIFY_EMAIL, payload, opts).await
    }

    async fn distribute_send_reset_password_email(
        &self,
        payload: &PayloadSendResetPasswordEmail,
        opts: TaskOptions,
    ) -> Result<(), DomainError> {
        self.distribute(TASK_SEND_RESET_PASSWORD_EMAIL, payload, opts).await
    }
}

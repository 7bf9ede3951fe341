//! Consumer side of the task queue

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kk_shared::WorkerConfig;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::broker::TaskBroker;
use super::envelope::TaskEnvelope;
use crate::errors::{DomainError, TaskError};

const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10 * 60);
const LEASE_RECOVERY_INTERVAL: Duration = Duration::from_secs(60);

/// Work performed for one task type
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn process(&self, task: &TaskEnvelope) -> Result<(), TaskError>;
}

/// Delay before retry number `retried + 1`: 1s doubling, capped at 10 minutes
pub fn retry_delay(retried: u32) -> Duration {
    2u32.checked_pow(retried)
        .and_then(|factor| BASE_RETRY_DELAY.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

/// What happened to a dispatched task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Retried { at: DateTime<Utc> },
    Archived { reason: String },
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub concurrency: usize,
    /// Queue names and relative weights
    pub queues: Vec<(String, u32)>,
    /// Sleep between polls when every queue is empty
    pub poll_interval: Duration,
}

impl From<&WorkerConfig> for ProcessorConfig {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            queues: config.queues.clone(),
            poll_interval: config.poll_interval,
        }
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::from(&WorkerConfig::default())
    }
}

/// Pulls due tasks from the broker and runs their handlers
pub struct TaskProcessor {
    broker: Arc<dyn TaskBroker>,
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
    config: ProcessorConfig,
}

impl TaskProcessor {
    pub fn new(broker: Arc<dyn TaskBroker>, config: ProcessorConfig) -> Self {
        Self {
            broker,
            handlers: HashMap::new(),
            config,
        }
    }

    /// Route `task_type` to `handler`
    pub fn handle(mut self, task_type: &str, handler: Arc<dyn TaskHandler>) -> Self {
        self.handlers.insert(task_type.to_string(), handler);
        self
    }

    /// Queue polling order for one iteration
    ///
    /// The first queue is a weighted random pick; the rest follow by
    /// descending weight so an empty pick falls back to the others.
    pub fn queue_order<R: Rng>(&self, rng: &mut R) -> Vec<String> {
        let total: u32 = self.config.queues.iter().map(|(_, w)| *w).sum();
        let mut ordered: Vec<&(String, u32)> = self.config.queues.iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        if total == 0 {
            return ordered.into_iter().map(|(q, _)| q.clone()).collect();
        }

        let mut roll = rng.gen_range(0..total);
        let mut first = 0;
        for (index, (_, weight)) in ordered.iter().enumerate() {
            if roll < *weight {
                first = index;
                break;
            }
            roll -= weight;
        }

        let picked = ordered.remove(first);
        std::iter::once(picked)
            .chain(ordered)
            .map(|(q, _)| q.clone())
            .collect()
    }

    /// Claim and run at most one due task
    ///
    /// Returns `Ok(None)` when every queue is empty.
    pub async fn process_next(&self) -> Result<Option<TaskOutcome>, DomainError> {
        let order = self.queue_order(&mut rand::thread_rng());
        for queue in order {
            if let Some(task) = self.broker.dequeue(&queue).await? {
                return self.dispatch(task).await.map(Some);
            }
        }
        Ok(None)
    }

    /// Run the handler for `task` and settle it with the broker
    pub async fn dispatch(&self, mut task: TaskEnvelope) -> Result<TaskOutcome, DomainError> {
        let result = self.run_handler(&task).await;

        let err = match result {
            Ok(()) => {
                self.broker.complete(&task).await?;
                debug!(task_id = %task.id, task_type = %task.task_type, "task completed");
                return Ok(TaskOutcome::Completed);
            }
            Err(err) => err,
        };

        error!(
            task_id = %task.id,
            task_type = %task.task_type,
            payload_size = task.payload.len(),
            attempt = task.retried + 1,
            error = %err,
            "process task failed"
        );
        task.last_error = Some(err.to_string());

        if err.is_skip_retry() {
            let reason = err.to_string();
            self.broker.archive(task).await?;
            return Ok(TaskOutcome::Archived { reason });
        }

        if task.retries_left() {
            let at = Utc::now()
                + chrono::Duration::from_std(retry_delay(task.retried)).unwrap_or_else(|_| chrono::Duration::zero());
            task.retried += 1;
            self.broker.retry(task, at).await?;
            return Ok(TaskOutcome::Retried { at });
        }

        // No dead-letter escalation: exhausted tasks are archived and logged
        warn!(
            task_id = %task.id,
            task_type = %task.task_type,
            retried = task.retried,
            max_retry = task.max_retry,
            "task retries exhausted"
        );
        self.broker.archive(task).await?;
        Ok(TaskOutcome::Archived {
            reason: String::from("retries exhausted"),
        })
    }

    async fn run_handler(&self, task: &TaskEnvelope) -> Result<(), TaskError> {
        let Some(handler) = self.handlers.get(&task.task_type).cloned() else {
            return Err(TaskError::skip_retry(format!(
                "no handler registered for task type {}",
                task.task_type
            )));
        };

        // Run on its own task so a panicking handler only fails this attempt
        let owned = task.clone();
        match tokio::spawn(async move { handler.process(&owned).await }).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(TaskError::retryable("task handler panicked")),
            Err(e) => Err(TaskError::retryable(format!("task handler aborted: {}", e))),
        }
    }

    /// Spawn the worker pool and the lease recovery loop
    pub fn start(self: Arc<Self>) -> ProcessorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut workers = Vec::with_capacity(self.config.concurrency + 1);

        for worker in 0..self.config.concurrency {
            let processor = self.clone();
            let stop_rx = stop_rx.clone();
            workers.push(tokio::spawn(async move {
                processor.worker_loop(worker, stop_rx).await;
            }));
        }

        let processor = self.clone();
        workers.push(tokio::spawn(async move {
            processor.recovery_loop(stop_rx).await;
        }));

        info!(
            concurrency = self.config.concurrency,
            queues = ?self.config.queues,
            "task processor started"
        );
        ProcessorHandle { stop_tx, workers }
    }

    async fn worker_loop(&self, worker: usize, mut stop_rx: watch::Receiver<bool>) {
        loop {
            if *stop_rx.borrow() {
                break;
            }

            match self.process_next().await {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => error!(worker, "task broker error: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!(worker, "task worker stopped");
    }

    async fn recovery_loop(&self, mut stop_rx: watch::Receiver<bool>) {
        let mut timer = tokio::time::interval(LEASE_RECOVERY_INTERVAL);
        loop {
            tokio::select! {
                _ = timer.tick() => {
                    match self.broker.recover_expired().await {
                        Ok(0) => {}
                        Ok(recovered) => warn!(recovered, "requeued tasks with expired leases"),
                        Err(e) => error!("failed to recover expired task leases: {}", e),
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

/// Running worker pool; dropping it does not stop the workers
pub struct ProcessorHandle {
    stop_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl ProcessorHandle {
    /// Ask workers to stop after their current task and wait for them
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("task worker ended abnormally: {}", e);
            }
        }
        info!("task processor stopped");
    }
}

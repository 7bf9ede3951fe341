//! In-memory task broker

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::broker::{TaskBroker, DEFAULT_LEASE};
use super::envelope::TaskEnvelope;
use crate::errors::DomainError;

#[derive(Default)]
struct State {
    queues: HashMap<String, Vec<TaskEnvelope>>,
    active: HashMap<Uuid, (TaskEnvelope, DateTime<Utc>)>,
    archived: Vec<TaskEnvelope>,
    completed: Vec<TaskEnvelope>,
}

/// Broker keeping every queue in process memory
#[derive(Clone)]
pub struct MockTaskBroker {
    state: Arc<Mutex<State>>,
    lease: Duration,
    unavailable: Arc<AtomicBool>,
}

impl Default for MockTaskBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskBroker {
    pub fn new() -> Self {
        Self::with_lease(DEFAULT_LEASE)
    }

    pub fn with_lease(lease: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            lease,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every call fail with a dependency error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Tasks waiting in `queue`, due or not
    pub fn pending(&self, queue: &str) -> Vec<TaskEnvelope> {
        self.lock()
            .map(|s| s.queues.get(queue).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn archived(&self) -> Vec<TaskEnvelope> {
        self.lock().map(|s| s.archived.clone()).unwrap_or_default()
    }

    pub fn completed(&self) -> Vec<TaskEnvelope> {
        self.lock().map(|s| s.completed.clone()).unwrap_or_default()
    }

    pub fn active_count(&self) -> usize {
        self.lock().map(|s| s.active.len()).unwrap_or_default()
    }

    /// Make every pending task due now
    pub fn make_all_due(&self) {
        if let Ok(mut state) = self.lock() {
            let now = Utc::now();
            for task in state.queues.values_mut().flatten() {
                task.process_at = now;
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::dependency("task broker unavailable"));
        }
        self.state
            .lock()
            .map_err(|_| DomainError::internal("task broker state poisoned"))
    }

    fn lease_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + chrono::Duration::from_std(self.lease).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

#[async_trait]
impl TaskBroker for MockTaskBroker {
    async fn enqueue(&self, task: TaskEnvelope) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.queues.entry(task.queue.clone()).or_default().push(task);
        Ok(())
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<TaskEnvelope>, DomainError> {
        let now = Utc::now();
        let deadline = self.lease_deadline(now);
        let mut state = self.lock()?;

        let Some(tasks) = state.queues.get_mut(queue) else {
            return Ok(None);
        };
        let next = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_due_at(now))
            .min_by_key(|(_, t)| t.process_at)
            .map(|(index, _)| index);

        let Some(index) = next else {
            return Ok(None);
        };
        let task = tasks.remove(index);
        state.active.insert(task.id, (task.clone(), deadline));
        Ok(Some(task))
    }

    async fn complete(&self, task: &TaskEnvelope) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.active.remove(&task.id);
        state.completed.push(task.clone());
        Ok(())
    }

    async fn retry(&self, mut task: TaskEnvelope, process_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.active.remove(&task.id);
        task.process_at = process_at;
        state.queues.entry(task.queue.clone()).or_default().push(task);
        Ok(())
    }

    async fn archive(&self, task: TaskEnvelope) -> Result<(), DomainError> {
        let mut state = self.lock()?;
        state.active.remove(&task.id);
        state.archived.push(task);
        Ok(())
    }

    async fn recover_expired(&self) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut state = self.lock()?;
        let expired: Vec<Uuid> = state
            .active
            .iter()
            .filter(|(_, (_, deadline))| *deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            if let Some((mut task, _)) = state.active.remove(id) {
                task.process_at = now;
                state.queues.entry(task.queue.clone()).or_default().push(task);
            }
        }
        Ok(expired.len() as u64)
    }
}

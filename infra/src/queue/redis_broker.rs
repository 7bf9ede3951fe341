//! Redis implementation of the task broker
//!
//! Layout (all keys prefixed by the client):
//! - `tasks` hash: task id -> envelope JSON
//! - `queue:<name>` sorted set: task ids scored by `process_at` (ms)
//! - `active` sorted set: claimed task ids scored by lease deadline (ms)
//! - `archived` list: envelopes that will not run again, newest first
//!
//! A claim moves an id from its queue to `active` in one script, so only one
//! worker can own a task; an id whose envelope is gone is dropped instead of
//! leased. Every state change touching more than one key runs
//! in a MULTI/EXEC pipeline.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kk_core::errors::DomainError;
use kk_core::services::tasks::{TaskBroker, TaskEnvelope, DEFAULT_LEASE};
use redis::aio::MultiplexedConnection;
use redis::Script;
use tracing::{debug, warn};

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Archived envelopes kept for inspection
pub const ARCHIVE_CAPACITY: isize = 1000;

const CLAIM_SCRIPT: &str = r#"
local ids = redis.call('ZRANGEBYSCORE', KEYS[1], '-inf', ARGV[1], 'LIMIT', 0, 1)
if #ids == 0 then
  return false
end
local id = ids[1]
if redis.call('ZREM', KEYS[1], id) == 0 then
  return false
end
local raw = redis.call('HGET', KEYS[3], id)
if not raw then
  return false
end
redis.call('ZADD', KEYS[2], ARGV[2], id)
return raw
"#;

const REQUEUE_SCRIPT: &str = r#"
if redis.call('ZREM', KEYS[1], ARGV[1]) == 1 then
  redis.call('ZADD', KEYS[2], ARGV[2], ARGV[1])
  return 1
end
return 0
"#;

pub struct RedisTaskBroker {
    client: RedisClient,
    lease: Duration,
    claim: Script,
    requeue: Script,
}

impl RedisTaskBroker {
    pub fn new(client: RedisClient) -> Self {
        Self::with_lease(client, DEFAULT_LEASE)
    }

    pub fn with_lease(client: RedisClient, lease: Duration) -> Self {
        Self {
            client,
            lease,
            claim: Script::new(CLAIM_SCRIPT),
            requeue: Script::new(REQUEUE_SCRIPT),
        }
    }

    fn tasks_key(&self) -> String {
        self.client.key("tasks")
    }

    fn queue_key(&self, queue: &str) -> String {
        self.client.key(&format!("queue:{}", queue))
    }

    fn active_key(&self) -> String {
        self.client.key("active")
    }

    fn archived_key(&self) -> String {
        self.client.key("archived")
    }

    fn lease_deadline(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() + i64::try_from(self.lease.as_millis()).unwrap_or(i64::MAX / 2)
    }

    /// Drop `id` from the active set, and its envelope too when `drop_envelope`
    async fn release_lease(
        &self,
        conn: &mut MultiplexedConnection,
        id: &str,
        drop_envelope: bool,
    ) -> Result<(), DomainError> {
        let mut pipe = redis::pipe();
        pipe.atomic().zrem(self.active_key(), id).ignore();
        if drop_envelope {
            pipe.hdel(self.tasks_key(), id).ignore();
        }
        pipe.query_async::<_, ()>(conn).await.map_err(InfrastructureError::from)?;
        Ok(())
    }
}

fn encode(task: &TaskEnvelope) -> Result<String, DomainError> {
    serde_json::to_string(task).map_err(|e| InfrastructureError::from(e).into())
}

fn decode(raw: &str) -> Result<TaskEnvelope, DomainError> {
    serde_json::from_str(raw).map_err(|e| InfrastructureError::from(e).into())
}

#[async_trait]
impl TaskBroker for RedisTaskBroker {
    async fn enqueue(&self, task: TaskEnvelope) -> Result<(), DomainError> {
        let json = encode(&task)?;
        let mut conn = self.client.connection();

        redis::pipe()
            .atomic()
            .hset(self.tasks_key(), task.id.to_string(), json)
            .ignore()
            .zadd(self.queue_key(&task.queue), task.id.to_string(), task.process_at.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<TaskEnvelope>, DomainError> {
        let now = Utc::now();
        let mut conn = self.client.connection();

        let raw: Option<String> = self
            .claim
            .key(self.queue_key(queue))
            .key(self.active_key())
            .key(self.tasks_key())
            .arg(now.timestamp_millis())
            .arg(self.lease_deadline(now))
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        match raw {
            Some(raw) => {
                let task = decode(&raw)?;
                debug!(task_id = %task.id, queue, "claimed task");
                Ok(Some(task))
            }
            None => Ok(None),
        }
    }

    async fn complete(&self, task: &TaskEnvelope) -> Result<(), DomainError> {
        let mut conn = self.client.connection();
        redis::pipe()
            .atomic()
            .zrem(self.active_key(), task.id.to_string())
            .ignore()
            .hdel(self.tasks_key(), task.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn retry(&self, mut task: TaskEnvelope, process_at: DateTime<Utc>) -> Result<(), DomainError> {
        task.process_at = process_at;
        let json = encode(&task)?;
        let mut conn = self.client.connection();

        redis::pipe()
            .atomic()
            .zrem(self.active_key(), task.id.to_string())
            .ignore()
            .hset(self.tasks_key(), task.id.to_string(), json)
            .ignore()
            .zadd(self.queue_key(&task.queue), task.id.to_string(), process_at.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn archive(&self, task: TaskEnvelope) -> Result<(), DomainError> {
        let json = encode(&task)?;
        let mut conn = self.client.connection();

        redis::pipe()
            .atomic()
            .zrem(self.active_key(), task.id.to_string())
            .ignore()
            .hdel(self.tasks_key(), task.id.to_string())
            .ignore()
            .lpush(self.archived_key(), json)
            .ignore()
            .ltrim(self.archived_key(), 0, ARCHIVE_CAPACITY - 1)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn recover_expired(&self) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut conn = self.client.connection();

        let expired: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(self.active_key())
            .arg("-inf")
            .arg(now.timestamp_millis())
            .query_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;

        let mut recovered = 0;
        for id in expired {
            let raw: Option<String> = redis::cmd("HGET")
                .arg(self.tasks_key())
                .arg(&id)
                .query_async(&mut conn)
                .await
                .map_err(InfrastructureError::from)?;
            let Some(raw) = raw else {
                // Completed between the two reads, or an orphaned lease
                self.release_lease(&mut conn, &id, false).await?;
                continue;
            };
            let task = match decode(&raw) {
                Ok(task) => task,
                Err(e) => {
                    warn!(task_id = %id, error = %e, "dropping undecodable task");
                    self.release_lease(&mut conn, &id, true).await?;
                    continue;
                }
            };

            let moved: i64 = self
                .requeue
                .key(self.active_key())
                .key(self.queue_key(&task.queue))
                .arg(&id)
                .arg(now.timestamp_millis())
                .invoke_async(&mut conn)
                .await
                .map_err(InfrastructureError::from)?;
            if moved == 1 {
                recovered += 1;
            }
        }
        Ok(recovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kk_core::services::tasks::{TaskOptions, QUEUE_CRITICAL};
    use kk_shared::CacheConfig;

    async fn broker(lease: Duration) -> RedisTaskBroker {
        let url = std::env::var("REDIS_ADDRESS").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let prefix = format!("kk-test-{}", uuid::Uuid::new_v4());
        let client = RedisClient::new(CacheConfig::new(url).with_prefix(prefix)).await.unwrap();
        RedisTaskBroker::with_lease(client, lease)
    }

    fn task() -> TaskEnvelope {
        TaskEnvelope::new(
            "task:test",
            "{}".to_string(),
            &TaskOptions::new().queue(QUEUE_CRITICAL),
            Utc::now(),
        )
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_ADDRESS
    async fn test_claim_is_exclusive() {
        let broker = broker(DEFAULT_LEASE).await;
        let task = task();
        broker.enqueue(task.clone()).await.unwrap();

        let claimed = broker.dequeue(QUEUE_CRITICAL).await.unwrap();
        assert_eq!(claimed.map(|t| t.id), Some(task.id));
        assert!(broker.dequeue(QUEUE_CRITICAL).await.unwrap().is_none());

        broker.complete(&task).await.unwrap();
        assert_eq!(broker.recover_expired().await.unwrap(), 0);
    }

    async fn active_count(broker: &RedisTaskBroker) -> i64 {
        let mut conn = broker.client.connection();
        redis::cmd("ZCARD")
            .arg(broker.active_key())
            .query_async(&mut conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_ADDRESS
    async fn test_claim_skips_id_without_envelope() {
        let broker = broker(DEFAULT_LEASE).await;
        let mut conn = broker.client.connection();
        redis::cmd("ZADD")
            .arg(broker.queue_key(QUEUE_CRITICAL))
            .arg(0)
            .arg("missing-envelope")
            .query_async::<_, ()>(&mut conn)
            .await
            .unwrap();

        assert!(broker.dequeue(QUEUE_CRITICAL).await.unwrap().is_none());
        assert_eq!(active_count(&broker).await, 0);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_ADDRESS
    async fn test_recover_releases_leases_without_envelope() {
        let broker = broker(DEFAULT_LEASE).await;
        let mut conn = broker.client.connection();
        redis::cmd("ZADD")
            .arg(broker.active_key())
            .arg(0)
            .arg("missing-envelope")
            .query_async::<_, ()>(&mut conn)
            .await
            .unwrap();
        redis::cmd("ZADD")
            .arg(broker.active_key())
            .arg(0)
            .arg("garbled")
            .query_async::<_, ()>(&mut conn)
            .await
            .unwrap();
        redis::cmd("HSET")
            .arg(broker.tasks_key())
            .arg("garbled")
            .arg("not json")
            .query_async::<_, ()>(&mut conn)
            .await
            .unwrap();

        assert_eq!(broker.recover_expired().await.unwrap(), 0);
        assert_eq!(active_count(&broker).await, 0);
        let leftover: bool = redis::cmd("HEXISTS")
            .arg(broker.tasks_key())
            .arg("garbled")
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(!leftover);
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_ADDRESS
    async fn test_future_tasks_are_not_due() {
        let broker = broker(DEFAULT_LEASE).await;
        let task = task();
        broker
            .retry(task.clone(), Utc::now() + chrono::Duration::minutes(5))
            .await
            .unwrap();
        assert!(broker.dequeue(QUEUE_CRITICAL).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore] // Requires a running Redis at REDIS_ADDRESS
    async fn test_expired_lease_is_recovered() {
        let broker = broker(Duration::from_millis(50)).await;
        let task = task();
        broker.enqueue(task.clone()).await.unwrap();
        broker.dequeue(QUEUE_CRITICAL).await.unwrap().unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(broker.recover_expired().await.unwrap(), 1);
        assert_eq!(
            broker.dequeue(QUEUE_CRITICAL).await.unwrap().map(|t| t.id),
            Some(task.id)
        );
    }
}

//! Redis client with connection retry and key prefixing
//!
//! One multiplexed connection is shared by every clone of the client.
//! Transient failures (I/O, loading, TRYAGAIN) are retried with exponential
//! backoff capped at [`MAX_BACKOFF`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use kk_shared::CacheConfig;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::InfrastructureError;

const MAX_BACKOFF: Duration = Duration::from_secs(5);

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisClient {
    /// Connect, trying `config.attempts` times
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "creating Redis client");

        let client = Client::open(config.url.as_str())
            .map_err(|e| InfrastructureError::Config(format!("invalid Redis URL: {}", e)))?;
        let connection = Self::connect_with_retry(&client, &config).await?;

        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = config.backoff;

        loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < config.attempts => {
                    warn!(attempt = attempts, error = %e, retry_in = ?delay, "failed to connect to Redis");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
                Err(e) => {
                    error!(attempts, error = %e, "giving up connecting to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Namespaced key, e.g. `keykeeper:blacklist:<id>`
    pub fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// A handle on the shared connection for multi-command operations
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Run `operation`, retrying transient failures
    pub async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.backoff;

        loop {
            attempts += 1;
            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.attempts && is_retriable_error(&e) => {
                    warn!(attempt = attempts, error = %e, retry_in = ?delay, "Redis operation failed");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `SET key value PX ttl`
    pub async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        let value = value.to_string();
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(&key)
                    .arg(&value)
                    .arg("PX")
                    .arg(millis)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await?;
        debug!(key = %key, ttl_ms = millis, "set key");
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.key(key);
        let exists = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.exists::<_, bool>(key).await })
            })
            .await?;
        Ok(exists)
    }
}

fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL for logging
fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(proto_end), Some(at)) if at > proto_end => {
            format!("{}****{}", &url[..proto_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

//! Redis-backed token revocation cache

use std::time::Duration;

use async_trait::async_trait;
use kk_core::errors::DomainError;
use kk_core::services::revocation::RevocationCache;

use super::redis_client::RedisClient;

/// Revoked payload ids stored as `blacklist:<id>` keys with a PX expiry
#[derive(Clone)]
pub struct RedisRevocationCache {
    client: RedisClient,
}

impl RedisRevocationCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn entry_key(payload_id: &str) -> String {
        format!("blacklist:{}", payload_id)
    }
}

#[async_trait]
impl RevocationCache for RedisRevocationCache {
    async fn blacklist(&self, payload_id: &str, ttl: Duration) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Ok(());
        }
        self.client
            .set_with_ttl(&Self::entry_key(payload_id), "1", ttl)
            .await?;
        Ok(())
    }

    async fn is_blacklisted(&self, payload_id: &str) -> Result<bool, DomainError> {
        Ok(self.client.exists(&Self::entry_key(payload_id)).await?)
    }
}

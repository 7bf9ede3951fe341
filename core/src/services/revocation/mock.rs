//! In-memory revocation cache

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::DomainError;

use super::cache::RevocationCache;

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline: Instant,
    ttl: Duration,
}

/// Revocation cache backed by a map of deadlines on the tokio clock
///
/// Entries expire like Redis keys; tests can drive expiry with
/// `tokio::time::pause` and `advance`.
#[derive(Clone, Default)]
pub struct MockRevocationCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockRevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a dependency error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// TTL passed to the last `blacklist` call for `payload_id`
    pub async fn recorded_ttl(&self, payload_id: &str) -> Option<Duration> {
        self.entries.read().await.get(payload_id).map(|e| e.ttl)
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::dependency("revocation cache unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationCache for MockRevocationCache {
    async fn blacklist(&self, payload_id: &str, ttl: Duration) -> Result<(), DomainError> {
        self.check_available()?;
        let entry = Entry {
            deadline: Instant::now() + ttl,
            ttl,
        };
        self.entries.write().await.insert(payload_id.to_string(), entry);
        Ok(())
    }

    async fn is_blacklisted(&self, payload_id: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        match entries.get(payload_id) {
            Some(entry) if entry.deadline > now => Ok(true),
            Some(_) => {
                entries.remove(payload_id);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

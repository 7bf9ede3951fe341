//! Revocation cache contract and TTL computation

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::entities::TokenPayload;
use crate::errors::DomainError;

/// Cache of revoked token payload ids
///
/// Implementations must provide atomic single-key writes and reads; no
/// multi-key consistency is required.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Record `payload_id` as revoked for `ttl`
    ///
    /// # Arguments
    /// * `payload_id` - The token payload id
    /// * `ttl` - Remaining lifetime of the token; see [`revocation_ttl`]
    async fn blacklist(&self, payload_id: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Whether `payload_id` is currently revoked
    ///
    /// Absence after the entry's TTL elapsed reads as "not revoked", which is
    /// safe because the token itself has expired by then.
    async fn is_blacklisted(&self, payload_id: &str) -> Result<bool, DomainError>;
}

/// TTL of a revocation entry for `payload` revoked at `now`
///
/// Equals `expires_at - now` plus `skew_allowance`, floored at zero. It is
/// never derived from the token's original full duration.
pub fn revocation_ttl(payload: &TokenPayload, now: DateTime<Utc>, skew_allowance: Duration) -> Duration {
    (payload.expires_at - now)
        .to_std()
        .map(|remaining| remaining + skew_allowance)
        .unwrap_or_else(|_| {
            // Already expired on this clock; only the allowance may remain
            let overdue = (now - payload.expires_at).to_std().unwrap_or_default();
            skew_allowance.saturating_sub(overdue)
        })
}

/// Revoke `payload` in `cache` for the rest of its lifetime
///
/// A token with no remaining lifetime is not written, since verification
/// already rejects it.
pub async fn revoke_payload(
    cache: &dyn RevocationCache,
    payload: &TokenPayload,
    now: DateTime<Utc>,
    skew_allowance: Duration,
) -> Result<(), DomainError> {
    let ttl = revocation_ttl(payload, now, skew_allowance);
    if ttl.is_zero() {
        debug!(payload_id = %payload.id, "skipping revocation of expired token");
        return Ok(());
    }
    cache.blacklist(&payload.id.to_string(), ttl).await
}

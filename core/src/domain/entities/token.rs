//! Session token payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// Public header every token string starts with
pub const TOKEN_HEADER: &str = "v1.local.";

/// Claims carried inside an encrypted session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Unique payload id; the revocation cache key
    pub id: Uuid,
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenPayload {
    /// Creates a payload with a fresh random id valid for `duration` from `now`
    ///
    /// Fails with `TokenError::DurationOutOfRange` when the expiry would not
    /// fit in a timestamp.
    pub fn new(user_id: i64, duration: Duration, now: DateTime<Utc>) -> Result<Self, TokenError> {
        let expires_at = now
            .checked_add_signed(duration)
            .ok_or(TokenError::DurationOutOfRange)?;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            issued_at: now,
            expires_at,
        })
    }

    /// A payload is valid iff `now <= expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Remaining lifetime at `now`, zero once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now).to_std().unwrap_or_default()
    }
}

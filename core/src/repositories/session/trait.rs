//! Session store trait defining the interface for session persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{NewSession, Session, SessionScope};
use crate::errors::DomainError;

/// Repository trait for durable session records
///
/// Sessions are written by the login, reset-password and verify-email flows
/// and read back when an emailed link is redeemed. The stored `token` column
/// holds a token fragment, never the full token string.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session record
    ///
    /// # Arguments
    /// * `params` - Session fields; the id is chosen by the caller
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored record including `created_at`
    /// * `Err(DomainError::Conflict)` - A session with the same id exists
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use kk_core::domain::entities::{NewSession, SessionScope};
    /// # use kk_core::repositories::SessionRepository;
    /// # async fn example(repo: &dyn SessionRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let session = repo
    ///     .create_session(NewSession {
    ///         id: Uuid::new_v4(),
    ///         user_id: 42,
    ///         token: "fragment".to_string(),
    ///         scope: SessionScope::ResetPassword,
    ///         client_ip: "10.0.0.1".to_string(),
    ///         user_agent: "curl/8.0".to_string(),
    ///         is_blocked: false,
    ///         expires_at: Utc::now() + Duration::minutes(25),
    ///     })
    ///     .await?;
    /// println!("created session {}", session.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_session(&self, params: NewSession) -> Result<Session, DomainError>;

    /// Fetch a session by id
    ///
    /// # Returns
    /// * `Ok(Session)` - Session found
    /// * `Err(DomainError::NotFound)` - No session with that id
    async fn get_session(&self, id: Uuid) -> Result<Session, DomainError>;

    /// Check whether a token fragment was issued in a session of `scope`
    ///
    /// Used before cryptographic verification of emailed links so that garbage
    /// input is rejected early and "never existed" is told apart from "expired".
    /// A fragment stored under a different scope does not match, so a login
    /// token cannot be redeemed as a reset or verification link.
    async fn check_token_exists(&self, token_fragment: &str, scope: SessionScope) -> Result<bool, DomainError>;

    /// Delete every session whose `expires_at` is before now
    ///
    /// Idempotent. Never removes a session that has not yet expired.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of deleted records
    async fn delete_expired_sessions(&self) -> Result<u64, DomainError>;
}

//! Session records persisted by the session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose tag of a session record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionScope {
    Login,
    ResetPassword,
    VerifyEmail,
}

impl SessionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionScope::Login => "login",
            SessionScope::ResetPassword => "reset_password",
            SessionScope::VerifyEmail => "verify_email",
        }
    }
}

impl std::fmt::Display for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(SessionScope::Login),
            "reset_password" => Ok(SessionScope::ResetPassword),
            "verify_email" => Ok(SessionScope::VerifyEmail),
            _ => Err(format!("unknown session scope: {}", s)),
        }
    }
}

/// Persisted session record
///
/// `token` holds the token fragment, never the full token string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub token: String,
    pub scope: SessionScope,
    pub client_ip: String,
    pub user_agent: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Parameters for `SessionRepository::create_session`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub id: Uuid,
    pub user_id: i64,
    pub token: String,
    pub scope: SessionScope,
    pub client_ip: String,
    pub user_agent: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}

/// Origin of the request that triggered a session or task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_ip: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn new(client_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            user_agent: user_agent.into(),
        }
    }
}

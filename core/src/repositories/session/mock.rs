//! In-memory implementation of SessionRepository

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{NewSession, Session, SessionScope};
use crate::errors::DomainError;

use super::trait_::SessionRepository;

/// Mock session repository for tests and local runs
#[derive(Clone)]
pub struct MockSessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a fully formed record, bypassing `create_session`
    pub async fn insert(&self, session: Session) {
        self.sessions.write().await.insert(session.id, session);
    }

    /// Snapshot of every stored session
    pub async fn all(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for MockSessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create_session(&self, params: NewSession) -> Result<Session, DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&params.id) {
            return Err(DomainError::conflict("session already exists"));
        }

        let session = Session {
            id: params.id,
            user_id: params.user_id,
            token: params.token,
            scope: params.scope,
            client_ip: params.client_ip,
            user_agent: params.user_agent,
            is_blocked: params.is_blocked,
            expires_at: params.expires_at,
            created_at: Utc::now(),
        };
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, DomainError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("session"))
    }

    async fn check_token_exists(&self, token_fragment: &str, scope: SessionScope) -> Result<bool, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.values().any(|s| s.token == token_fragment && s.scope == scope))
    }

    async fn delete_expired_sessions(&self) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

//! Postgres implementation of the SessionRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use kk_core::domain::entities::{NewSession, Session, SessionScope};
use kk_core::errors::DomainError;
use kk_core::repositories::SessionRepository;

use super::{is_unique_violation, query_error};
use crate::InfrastructureError;

const SESSION_COLUMNS: &str =
    "id, user_id, token, scope, client_ip, user_agent, is_blocked, expires_at, created_at";

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: i64,
    token: String,
    scope: String,
    client_ip: String,
    user_agent: String,
    is_blocked: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let scope: SessionScope = row
            .scope
            .parse()
            .map_err(|_| DomainError::internal(format!("unknown session scope {:?}", row.scope)))?;
        Ok(Session {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            scope,
            client_ip: row.client_ip,
            user_agent: row.user_agent,
            is_blocked: row.is_blocked,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create_session(&self, params: NewSession) -> Result<Session, DomainError> {
        let query = format!(
            "INSERT INTO sessions (id, user_id, token, scope, client_ip, user_agent, is_blocked, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            SESSION_COLUMNS
        );
        let row: SessionRow = sqlx::query_as(&query)
            .bind(params.id)
            .bind(params.user_id)
            .bind(&params.token)
            .bind(params.scope.as_str())
            .bind(&params.client_ip)
            .bind(&params.user_agent)
            .bind(params.is_blocked)
            .bind(params.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict(format!("session {} already exists", params.id))
                } else {
                    query_error("session", e)
                }
            })?;
        Session::try_from(row)
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, DomainError> {
        let query = format!("SELECT {} FROM sessions WHERE id = $1 LIMIT 1", SESSION_COLUMNS);
        let row: SessionRow = sqlx::query_as(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("session", e))?;
        Session::try_from(row)
    }

    async fn check_token_exists(&self, token_fragment: &str, scope: SessionScope) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sessions WHERE token = $1 AND scope = $2)")
                .bind(token_fragment)
                .bind(scope.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(exists)
    }

    async fn delete_expired_sessions(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < now()")
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(result.rows_affected())
    }
}

//! Postgres implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, warn};

use kk_core::domain::entities::{NewUser, User, UserUpdate};
use kk_core::errors::DomainError;
use kk_core::repositories::{AfterCreate, UserRepository};

use super::{is_unique_violation, query_error};
use crate::InfrastructureError;

const USER_COLUMNS: &str = "id, full_name, hashed_password, email, profile_image_url, \
                            password_changed_at, created_at, is_active, is_email_verified";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    full_name: String,
    hashed_password: String,
    email: String,
    profile_image_url: Option<String>,
    password_changed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    is_active: bool,
    is_email_verified: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            full_name: row.full_name,
            hashed_password: row.hashed_password,
            email: row.email,
            profile_image_url: row.profile_image_url,
            password_changed_at: row.password_changed_at,
            created_at: row.created_at,
            is_active: row.is_active,
            is_email_verified: row.is_email_verified,
        }
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Insert the user and run `after_create` inside one transaction
    ///
    /// The transaction is rolled back when `after_create` fails.
    async fn create_user_tx(&self, params: NewUser, after_create: AfterCreate) -> Result<User, DomainError> {
        let mut tx = self.pool.begin().await.map_err(InfrastructureError::from)?;

        let query = format!(
            "INSERT INTO users (full_name, hashed_password, email, profile_image_url) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row: UserRow = sqlx::query_as(&query)
            .bind(&params.full_name)
            .bind(&params.hashed_password)
            .bind(&params.email)
            .bind(&params.profile_image_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict("user already exist")
                } else {
                    query_error("user", e)
                }
            })?;
        let user = User::from(row);

        if let Err(err) = after_create(user.clone()).await {
            warn!(user_id = user.id, error = %err, "rolling back user creation");
            tx.rollback().await.map_err(InfrastructureError::from)?;
            return Err(err);
        }

        tx.commit().await.map_err(InfrastructureError::from)?;
        debug!(user_id = user.id, "created user");
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = $1 LIMIT 1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(|e| query_error("user", e))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1) LIMIT 1",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(|e| query_error("user", e))
    }

    async fn update_user(&self, update: UserUpdate) -> Result<User, DomainError> {
        let query = format!(
            "UPDATE users SET \
               hashed_password = COALESCE($1, hashed_password), \
               password_changed_at = COALESCE($2, password_changed_at), \
               is_active = COALESCE($3, is_active), \
               is_email_verified = COALESCE($4, is_email_verified), \
               email = COALESCE($5, email) \
             WHERE id = $6 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&update.hashed_password)
            .bind(update.password_changed_at)
            .bind(update.is_active)
            .bind(update.is_email_verified)
            .bind(&update.email)
            .bind(update.id)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict("email already in use")
                } else {
                    query_error("user", e)
                }
            })
    }
}

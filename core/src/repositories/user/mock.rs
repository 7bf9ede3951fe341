//! In-memory implementation of UserRepository

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{NewUser, User, UserUpdate};
use crate::errors::DomainError;

use super::trait_::{AfterCreate, UserRepository};

/// Mock user repository for tests and local runs
#[derive(Clone)]
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<i64, User>>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Insert a fully formed user, bypassing `create_user_tx`
    pub async fn insert(&self, user: User) {
        self.next_id.fetch_max(user.id + 1, Ordering::SeqCst);
        self.users.write().await.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn create_user_tx(&self, params: NewUser, after_create: AfterCreate) -> Result<User, DomainError> {
        let user = {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.email.eq_ignore_ascii_case(&params.email)) {
                return Err(DomainError::conflict("user already exist"));
            }

            let now = Utc::now();
            let user = User {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                full_name: params.full_name,
                hashed_password: params.hashed_password,
                email: params.email,
                profile_image_url: params.profile_image_url,
                password_changed_at: now,
                created_at: now,
                is_active: false,
                is_email_verified: false,
            };
            users.insert(user.id, user.clone());
            user
        };

        // Roll back on callback failure
        if let Err(err) = after_create(user.clone()).await {
            self.users.write().await.remove(&user.id);
            return Err(err);
        }
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| DomainError::not_found("user"))
    }

    async fn update_user(&self, update: UserUpdate) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&update.id)
            .ok_or_else(|| DomainError::not_found("user"))?;
        update.apply(user);
        Ok(user.clone())
    }
}

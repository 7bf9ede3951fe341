//! User repository trait defining the interface for account persistence.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::entities::{NewUser, User, UserUpdate};
use crate::errors::DomainError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback run inside the user-creation transaction
///
/// An error rolls the new row back and is returned to the caller.
pub type AfterCreate = Box<dyn FnOnce(User) -> BoxFuture<'static, Result<(), DomainError>> + Send>;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, then run `after_create` before committing
    ///
    /// Registration uses the callback to enqueue the verification email so
    /// that a user row never exists without its task.
    ///
    /// # Returns
    /// * `Ok(User)` - The committed user
    /// * `Err(DomainError::Conflict)` - The email is already registered
    /// * `Err(_)` - Whatever `after_create` returned; nothing was committed
    async fn create_user_tx(&self, params: NewUser, after_create: AfterCreate) -> Result<User, DomainError>;

    /// Find a user by id
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - No such user
    async fn get_user(&self, id: i64) -> Result<User, DomainError>;

    /// Find a user by email address
    async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError>;

    /// Apply a partial update and return the updated row
    async fn update_user(&self, update: UserUpdate) -> Result<User, DomainError>;
}

//! Reminder repository trait.

use async_trait::async_trait;
use kk_shared::types::PageMetadata;

use crate::domain::entities::{ListRemindersQuery, NewReminder, Reminder};
use crate::errors::DomainError;

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn create_reminder(&self, params: NewReminder) -> Result<Reminder, DomainError>;

    /// # Returns
    /// * `Err(DomainError::NotFound)` - No reminder with that id
    async fn get_reminder(&self, id: i64) -> Result<Reminder, DomainError>;

    /// List one page of a user's reminders
    ///
    /// `query.filters` must already be validated. Results are ordered by the
    /// requested sort column, then by `id` ascending.
    async fn list_reminders(
        &self,
        user_id: i64,
        query: &ListRemindersQuery,
    ) -> Result<(Vec<Reminder>, PageMetadata), DomainError>;
}

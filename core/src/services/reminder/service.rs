//! Reminder creation and lookup scoped to the calling user

use std::sync::Arc;

use kk_shared::types::PageMetadata;
use kk_shared::validation::FieldErrors;
use tracing::debug;

use crate::domain::entities::{ListRemindersQuery, NewReminder, Reminder};
use crate::domain::value_objects::ReminderInterval;
use crate::errors::DomainError;
use crate::repositories::ReminderRepository;

pub struct ReminderService {
    reminders: Arc<dyn ReminderRepository>,
}

impl ReminderService {
    pub fn new(reminders: Arc<dyn ReminderRepository>) -> Self {
        Self { reminders }
    }

    /// Create a reminder for `user_id`
    ///
    /// # Arguments
    /// * `website_url` - Site whose password should be rotated
    /// * `interval` - Human interval such as `"3 months"`
    pub async fn create(&self, user_id: i64, website_url: &str, interval: &str) -> Result<Reminder, DomainError> {
        if website_url.trim().is_empty() {
            return Err(DomainError::validation("website_url: must be provided"));
        }
        let interval: ReminderInterval = interval.parse()?;

        let reminder = self
            .reminders
            .create_reminder(NewReminder::new(user_id, website_url.trim(), interval))
            .await?;
        debug!(user_id, reminder_id = reminder.id, "created reminder");
        Ok(reminder)
    }

    /// Another user's reminder reads as missing
    pub async fn get(&self, user_id: i64, id: i64) -> Result<Reminder, DomainError> {
        let reminder = self.reminders.get_reminder(id).await?;
        if reminder.user_id != user_id {
            return Err(DomainError::not_found("reminder"));
        }
        Ok(reminder)
    }

    pub async fn list(
        &self,
        user_id: i64,
        query: &ListRemindersQuery,
    ) -> Result<(Vec<Reminder>, PageMetadata), DomainError> {
        let mut problems = FieldErrors::new();
        for (field, message) in query.filters.validate() {
            problems.add(field, message);
        }
        if !problems.is_empty() {
            return Err(DomainError::validation(problems.summary()));
        }
        self.reminders.list_reminders(user_id, query).await
    }
}

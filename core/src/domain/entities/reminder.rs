//! Password reminder entity.

use chrono::{DateTime, Utc};
use kk_shared::types::Filters;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ReminderInterval;

/// Columns a reminder listing may be sorted by
pub const REMINDER_SORT_SAFELIST: [&str; 4] = ["id", "website_url", "interval", "updated_at"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    pub website_url: String,
    pub interval: ReminderInterval,
    pub updated_at: DateTime<Utc>,
    pub extension: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub user_id: i64,
    pub website_url: String,
    pub interval: ReminderInterval,
    pub extension: serde_json::Value,
}

impl NewReminder {
    pub fn new(user_id: i64, website_url: impl Into<String>, interval: ReminderInterval) -> Self {
        Self {
            user_id,
            website_url: website_url.into(),
            interval,
            extension: serde_json::json!({ "get_email_notifications": false }),
        }
    }
}

/// Search and paging parameters for listing reminders
#[derive(Debug, Clone)]
pub struct ListRemindersQuery {
    /// Case-insensitive substring match on `website_url`; empty matches all
    pub website_url: String,
    pub filters: Filters,
}

impl ListRemindersQuery {
    pub fn new(website_url: impl Into<String>, page: u32, page_size: u32, sort: impl Into<String>) -> Self {
        Self {
            website_url: website_url.into(),
            filters: Filters::new(page, page_size, sort, REMINDER_SORT_SAFELIST.to_vec()),
        }
    }

    pub fn matches(&self, reminder: &Reminder) -> bool {
        self.website_url.is_empty()
            || reminder
                .website_url
                .to_lowercase()
                .contains(&self.website_url.to_lowercase())
    }
}

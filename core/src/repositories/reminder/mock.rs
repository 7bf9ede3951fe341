//! In-memory implementation of ReminderRepository

use async_trait::async_trait;
use chrono::Utc;
use kk_shared::types::{PageMetadata, SortDirection};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{ListRemindersQuery, NewReminder, Reminder};
use crate::errors::DomainError;

use super::trait_::ReminderRepository;

#[derive(Clone)]
pub struct MockReminderRepository {
    reminders: Arc<RwLock<HashMap<i64, Reminder>>>,
    next_id: Arc<AtomicI64>,
}

impl MockReminderRepository {
    pub fn new() -> Self {
        Self {
            reminders: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MockReminderRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn compare(column: &str, a: &Reminder, b: &Reminder) -> Ordering {
    match column {
        "website_url" => a.website_url.cmp(&b.website_url),
        "interval" => a.interval.total_seconds().cmp(&b.interval.total_seconds()),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl ReminderRepository for MockReminderRepository {
    async fn create_reminder(&self, params: NewReminder) -> Result<Reminder, DomainError> {
        let reminder = Reminder {
            id: self.next_id.fetch_add(1, AtomicOrdering::SeqCst),
            user_id: params.user_id,
            website_url: params.website_url,
            interval: params.interval,
            updated_at: Utc::now(),
            extension: params.extension,
        };
        self.reminders.write().await.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn get_reminder(&self, id: i64) -> Result<Reminder, DomainError> {
        self.reminders
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("reminder"))
    }

    async fn list_reminders(
        &self,
        user_id: i64,
        query: &ListRemindersQuery,
    ) -> Result<(Vec<Reminder>, PageMetadata), DomainError> {
        let reminders = self.reminders.read().await;
        let mut matching: Vec<Reminder> = reminders
            .values()
            .filter(|r| r.user_id == user_id && query.matches(r))
            .cloned()
            .collect();

        let filters = &query.filters;
        let column = filters.sort_column();
        let direction = filters.sort_direction();
        matching.sort_by(|a, b| {
            let primary = match direction {
                SortDirection::Asc => compare(column, a, b),
                SortDirection::Desc => compare(column, b, a),
            };
            primary.then(a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(filters.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(filters.limit()).unwrap_or(0);
        let page = matching.into_iter().skip(offset).take(limit).collect();

        Ok((page, PageMetadata::calculate(total, filters.page, filters.page_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{IntervalUnit, ReminderInterval};

    async fn seed(repo: &MockReminderRepository, user_id: i64, url: &str, days: u32) -> Reminder {
        repo.create_reminder(NewReminder::new(
            user_id,
            url,
            ReminderInterval::new(days, IntervalUnit::Days),
        ))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user_and_filtered() {
        let repo = MockReminderRepository::new();
        seed(&repo, 1, "https://github.com", 30).await;
        seed(&repo, 1, "https://gitlab.com", 7).await;
        seed(&repo, 1, "https://example.org", 1).await;
        seed(&repo, 2, "https://github.com", 30).await;

        let query = ListRemindersQuery::new("GIT", 1, 15, "");
        let (page, metadata) = repo.list_reminders(1, &query).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|r| r.user_id == 1));
        assert_eq!(metadata.total_records, 2);
        assert_eq!(metadata.last_page, 1);
    }

    #[tokio::test]
    async fn test_list_sorts_and_paginates() {
        let repo = MockReminderRepository::new();
        seed(&repo, 1, "https://a.com", 30).await;
        seed(&repo, 1, "https://b.com", 7).await;
        seed(&repo, 1, "https://c.com", 90).await;

        let query = ListRemindersQuery::new("", 1, 2, "-interval");
        let (page, metadata) = repo.list_reminders(1, &query).await.unwrap();
        let urls: Vec<_> = page.iter().map(|r| r.website_url.as_str()).collect();
        assert_eq!(urls, vec!["https://c.com", "https://a.com"]);
        assert_eq!(metadata.last_page, 2);

        let query = ListRemindersQuery::new("", 2, 2, "-interval");
        let (page, _) = repo.list_reminders(1, &query).await.unwrap();
        assert_eq!(page[0].website_url, "https://b.com");
    }

    #[tokio::test]
    async fn test_empty_listing_has_empty_metadata() {
        let repo = MockReminderRepository::new();
        let query = ListRemindersQuery::new("", 1, 15, "id");
        let (page, metadata) = repo.list_reminders(1, &query).await.unwrap();
        assert!(page.is_empty());
        assert!(metadata.is_empty());
    }
}

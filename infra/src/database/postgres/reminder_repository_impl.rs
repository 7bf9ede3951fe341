//! Postgres implementation of the ReminderRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kk_shared::types::PageMetadata;
use sqlx::PgPool;

use kk_core::domain::entities::{ListRemindersQuery, NewReminder, Reminder};
use kk_core::errors::DomainError;
use kk_core::repositories::ReminderRepository;

use super::query_error;

const REMINDER_COLUMNS: &str = r#"id, user_id, website_url, "interval", updated_at, extension"#;

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: i64,
    user_id: i64,
    website_url: String,
    interval: String,
    updated_at: DateTime<Utc>,
    extension: serde_json::Value,
}

#[derive(sqlx::FromRow)]
struct CountedReminderRow {
    total_count: i64,
    #[sqlx(flatten)]
    reminder: ReminderRow,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = DomainError;

    fn try_from(row: ReminderRow) -> Result<Self, Self::Error> {
        Ok(Reminder {
            id: row.id,
            user_id: row.user_id,
            website_url: row.website_url,
            interval: row.interval.parse()?,
            updated_at: row.updated_at,
            extension: row.extension,
        })
    }
}

/// SQL column behind a safelisted sort key
///
/// Intervals sort by their length, not by their text.
fn order_column(sort_column: &str) -> &'static str {
    match sort_column {
        "website_url" => "website_url",
        "interval" => "interval_seconds",
        "updated_at" => "updated_at",
        _ => "id",
    }
}

pub struct PgReminderRepository {
    pool: PgPool,
}

impl PgReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderRepository for PgReminderRepository {
    async fn create_reminder(&self, params: NewReminder) -> Result<Reminder, DomainError> {
        let query = format!(
            r#"INSERT INTO reminders (user_id, website_url, "interval", interval_seconds, extension)
               VALUES ($1, $2, $3, $4, $5) RETURNING {}"#,
            REMINDER_COLUMNS
        );
        let row: ReminderRow = sqlx::query_as(&query)
            .bind(params.user_id)
            .bind(&params.website_url)
            .bind(params.interval.to_string())
            .bind(params.interval.total_seconds())
            .bind(&params.extension)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("reminder", e))?;
        Reminder::try_from(row)
    }

    async fn get_reminder(&self, id: i64) -> Result<Reminder, DomainError> {
        let query = format!("SELECT {} FROM reminders WHERE id = $1 LIMIT 1", REMINDER_COLUMNS);
        let row: ReminderRow = sqlx::query_as(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("reminder", e))?;
        Reminder::try_from(row)
    }

    async fn list_reminders(
        &self,
        user_id: i64,
        query: &ListRemindersQuery,
    ) -> Result<(Vec<Reminder>, PageMetadata), DomainError> {
        let filters = &query.filters;
        // Only safelisted identifiers reach the ORDER BY clause
        let sql = format!(
            "SELECT count(*) OVER() AS total_count, {} FROM reminders \
             WHERE user_id = $1 AND (website_url ILIKE '%' || $2 || '%' OR $2 = '') \
             ORDER BY {} {}, id ASC \
             LIMIT $3 OFFSET $4",
            REMINDER_COLUMNS,
            order_column(filters.sort_column()),
            filters.sort_direction().as_sql()
        );

        let rows: Vec<CountedReminderRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(&query.website_url)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("reminder", e))?;

        let total = rows.first().map(|r| r.total_count).unwrap_or_default();
        let reminders = rows
            .into_iter()
            .map(|r| Reminder::try_from(r.reminder))
            .collect::<Result<Vec<_>, _>>()?;
        let metadata = PageMetadata::calculate(
            u64::try_from(total).unwrap_or_default(),
            filters.page,
            filters.page_size,
        );
        Ok((reminders, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_column_maps_interval_to_seconds() {
        assert_eq!(order_column("interval"), "interval_seconds");
        assert_eq!(order_column("website_url"), "website_url");
        assert_eq!(order_column("anything-else"), "id");
    }
}

use kk_core::domain::entities::{ListRemindersQuery, Reminder};
use kk_shared::types::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use kk_shared::PageMetadata;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, max = 2048, message = "must be provided"))]
    pub website_url: String,

    /// For example `"3 months"`
    #[validate(length(min = 1, message = "must be provided"))]
    pub interval: String,
}

/// Search and paging query of `GET /reminders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRemindersParams {
    #[serde(default)]
    pub website_url: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub sort: String,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl From<ListRemindersParams> for ListRemindersQuery {
    fn from(params: ListRemindersParams) -> Self {
        ListRemindersQuery::new(params.website_url, params.page, params.page_size, params.sort)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderBody {
    pub reminder: Reminder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderListBody {
    pub reminders: Vec<Reminder>,
    pub metadata: PageMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_defaults() {
        let params: ListRemindersParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);

        let query = ListRemindersQuery::from(params);
        assert!(query.filters.validate().is_empty());
        assert_eq!(query.filters.sort_column(), "id");
    }
}

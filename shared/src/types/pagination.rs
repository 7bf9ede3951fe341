//! Pagination related types for list endpoints

use serde::{Deserialize, Serialize};

/// Smallest accepted page number
pub const MIN_PAGE: u32 = 1;
/// Largest accepted page number
pub const MAX_PAGE: u32 = 10_000_000;
/// Default page number when the client sends none
pub const DEFAULT_PAGE: u32 = 1;
/// Smallest accepted page size
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 20;
/// Default page size when the client sends none
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Sort direction derived from the `-` prefix of a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Page, size and sort parameters for list endpoints.
///
/// `sort` must be one of `sort_safelist` or the same value prefixed with
/// `-` for descending order. Call [`Filters::validate`] before using
/// [`Filters::sort_column`] in a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filters {
    pub page: u32,
    pub page_size: u32,
    pub sort: String,
    #[serde(skip)]
    pub sort_safelist: Vec<&'static str>,
}

impl Filters {
    pub fn new(page: u32, page_size: u32, sort: impl Into<String>, sort_safelist: Vec<&'static str>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist,
        }
    }

    /// Collect range and safelist violations as `(field, message)` pairs
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        let mut problems = Vec::new();
        if !(MIN_PAGE..=MAX_PAGE).contains(&self.page) {
            problems.push(("page", format!("must be between {} and {}", MIN_PAGE, MAX_PAGE)));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            problems.push((
                "page_size",
                format!("must be between {} and {}", MIN_PAGE_SIZE, MAX_PAGE_SIZE),
            ));
        }
        if !self.sort.is_empty() && self.safelisted_column().is_none() {
            problems.push(("sort", "invalid sort value".to_string()));
        }
        problems
    }

    fn safelisted_column(&self) -> Option<&'static str> {
        let column = self.sort.strip_prefix('-').unwrap_or(&self.sort);
        self.sort_safelist.iter().copied().find(|safe| *safe == column)
    }

    /// Column to order by; defaults to `id` when no sort was requested
    pub fn sort_column(&self) -> &'static str {
        self.safelisted_column().unwrap_or("id")
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// Paging metadata returned next to a page of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: u32,
    #[serde(skip_serializing_if = "is_zero_u64")]
    pub total_records: u64,
}

impl PageMetadata {
    /// Build metadata for a result set; empty when there are no records
    pub fn calculate(total_records: u64, page: u32, page_size: u32) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::default();
        }
        let last_page = total_records.div_ceil(u64::from(page_size));
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
            total_records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

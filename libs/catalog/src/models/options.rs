//! List options: the untrusted request shape and the validated query

use uuid::Uuid;

/// Sort direction requested for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    YearOfRelease,
}

impl SortField {
    /// Names accepted from callers
    pub const ALLOWED: [&'static str; 2] = ["title", "yearofrelease"];

    /// Map an allow-listed field name to its variant
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "yearofrelease" => Some(Self::YearOfRelease),
            _ => None,
        }
    }

    /// Column name in the `movies` table
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::YearOfRelease => "yearofrelease",
        }
    }
}

/// Listing options as received from a caller, not yet validated
#[derive(Debug, Clone, PartialEq)]
pub struct GetAllMoviesOptions {
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
    pub sort_field: Option<String>,
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: i32,
    pub page_size: i32,
    /// Only used to attach this user's rating, never as a filter
    pub user_id: Option<Uuid>,
}

impl Default for GetAllMoviesOptions {
    fn default() -> Self {
        Self {
            title: None,
            year_of_release: None,
            sort_field: None,
            sort_order: SortOrder::Unsorted,
            page: 1,
            page_size: 10,
            user_id: None,
        }
    }
}

impl GetAllMoviesOptions {
    pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }
}

/// Predicate shared by the page query and the count query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    /// Case-insensitive title substring
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
}

/// A resolved ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

/// Listing query that passed validation; the only shape the store accepts
#[derive(Debug, Clone, PartialEq)]
pub struct MovieListQuery {
    pub filter: MovieFilter,
    pub sort: Option<Sort>,
    pub page: u32,
    pub page_size: u32,
    pub user_id: Option<Uuid>,
}

impl MovieListQuery {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

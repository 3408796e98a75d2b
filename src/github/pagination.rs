//! Cursor pagination types for GitHub search results.
//!
//! GitHub's GraphQL search API pages with opaque cursors rather than page
//! numbers. [`SearchQuery`] describes one page request, [`SearchPage`] is the
//! answer, and [`TotalEstimate`] folds the reported totals into a running
//! estimate that never shrinks.

use serde::Deserialize;

use super::error::IntakeError;

/// Largest page size GitHub's search API accepts.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Cursor state returned with a page of results.
///
/// # Example
///
/// ```
/// use prism::github::pagination::PageInfo;
///
/// let info = PageInfo::new(true, Some("Y3Vyc29yOjUw".to_owned()));
/// assert!(info.has_next_page());
/// assert_eq!(info.end_cursor(), Some("Y3Vyc29yOjUw"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Creates page info from raw values.
    #[must_use]
    pub const fn new(has_next_page: bool, end_cursor: Option<String>) -> Self {
        Self {
            has_next_page,
            end_cursor,
        }
    }

    /// Returns page info for the final page.
    #[must_use]
    pub const fn last() -> Self {
        Self::new(false, None)
    }

    /// Returns true if more pages exist after this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Cursor to pass as `after` for the next page.
    #[must_use]
    pub fn end_cursor(&self) -> Option<&str> {
        self.end_cursor.as_deref()
    }
}

/// Parameters for fetching one page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    predicate: String,
    page_size: u8,
    cursor: Option<String>,
}

impl SearchQuery {
    /// Creates a query for the first page of `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::InvalidPagination`] when `page_size` is zero or
    /// above [`MAX_PAGE_SIZE`].
    pub fn new(predicate: impl Into<String>, page_size: u8) -> Result<Self, IntakeError> {
        validate_page_size(page_size)?;
        Ok(Self {
            predicate: predicate.into(),
            page_size,
            cursor: None,
        })
    }

    /// Resumes the query from an opaque cursor.
    #[must_use]
    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Search predicate, e.g. `repo:octo/widgets type:pr author:alice is:merged`.
    #[must_use]
    pub fn predicate(&self) -> &str {
        self.predicate.as_str()
    }

    /// Maximum number of nodes per page.
    #[must_use]
    pub const fn page_size(&self) -> u8 {
        self.page_size
    }

    /// Cursor of the previous page, absent for the first page.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// Validates a search page size.
///
/// # Errors
///
/// Returns [`IntakeError::InvalidPagination`] when the size is outside
/// `1..=MAX_PAGE_SIZE`.
pub fn validate_page_size(page_size: u8) -> Result<(), IntakeError> {
    if page_size == 0 {
        return Err(IntakeError::InvalidPagination {
            message: "page size must be at least 1".to_owned(),
        });
    }

    if page_size > MAX_PAGE_SIZE {
        return Err(IntakeError::InvalidPagination {
            message: format!("page size must not exceed {MAX_PAGE_SIZE}"),
        });
    }

    Ok(())
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage<T> {
    /// Result nodes on this page, in API order.
    pub nodes: Vec<T>,
    /// Cursor state.
    pub page_info: PageInfo,
    /// Total match count reported alongside this page.
    pub total_count: u64,
}

/// Running estimate of the total number of matches.
///
/// Search totals are approximate and can lag as paging proceeds, so the
/// estimate is the maximum of every `accumulated + reported` observation,
/// where `accumulated` is what earlier queries already contributed.
///
/// # Example
///
/// ```
/// use prism::github::pagination::TotalEstimate;
///
/// let estimate = TotalEstimate::default().observe(0, 120).observe(50, 40);
/// assert_eq!(estimate.get(), 120);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalEstimate(u64);

impl TotalEstimate {
    /// Starts an estimate at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Folds one page observation into the estimate.
    ///
    /// `accumulated` is the number of items collected before the query that
    /// reported `reported_total` started.
    #[must_use]
    pub const fn observe(self, accumulated: u64, reported_total: u64) -> Self {
        let candidate = accumulated.saturating_add(reported_total);
        if candidate > self.0 {
            Self(candidate)
        } else {
            self
        }
    }

    /// Current estimate.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

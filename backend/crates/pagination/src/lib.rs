//! Page/limit pagination primitives shared by backend list endpoints.
//!
//! Every list endpoint accepts `page` and `limit` query parameters and
//! responds with the same envelope: `{ items, total, page, pages }`. This
//! crate owns the clamping rules so endpoints cannot drift apart: `limit` is
//! capped at [`MAX_PAGE_SIZE`] regardless of the requested value, and `page`
//! is at least one.

use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of items a single page may return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request.
///
/// Construct via [`PageRequest::from_query`], which applies the clamping
/// rules; the fields are only readable afterwards, so an out-of-range request
/// can never reach a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a request from raw query values.
    ///
    /// Missing or zero `page` becomes 1. Missing or zero `limit` becomes
    /// `default_limit`; anything above [`MAX_PAGE_SIZE`] is clamped down.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, MAX_PAGE_SIZE};
    ///
    /// let request = PageRequest::from_query(None, Some(1000), 20);
    /// assert_eq!(request.limit(), MAX_PAGE_SIZE);
    /// assert_eq!(request.page(), 1);
    /// ```
    #[must_use]
    pub fn from_query(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .filter(|value| *value > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE)
            .max(1);
        Self { page, limit }
    }

    /// One-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page, already clamped to [`MAX_PAGE_SIZE`].
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset for SQL `OFFSET`/`LIMIT` style queries.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageEnvelope<T> {
    /// Items on this page, possibly empty past the last page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: u64,
    /// The page that was served.
    pub page: u32,
    /// Total number of pages for this `total` and limit.
    pub pages: u32,
}

impl<T> PageEnvelope<T> {
    /// Wrap one page of items, deriving `pages` from the total.
    ///
    /// A request past the last page yields empty `items` while `total` and
    /// `pages` stay accurate.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = total.div_ceil(u64::from(request.limit()));
        let pages = u32::try_from(pages).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page: request.page(),
            pages,
        }
    }

    /// The envelope returned for queries that match nothing by definition,
    /// such as a search with an empty query string.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            pages: 1,
        }
    }

    /// Map the item type while keeping the page bookkeeping.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageEnvelope<U> {
        PageEnvelope {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            pages: self.pages,
        }
    }
}

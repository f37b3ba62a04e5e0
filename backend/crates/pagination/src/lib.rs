//! Page-based pagination primitives shared by storefront repositories.
//!
//! A [`PageRequest`] is the validated, one-based page/limit pair supplied by
//! callers. Repositories turn it into a [`PageWindow`] (the skip/take pair a
//! document store understands) and may wrap results in a [`Page`] envelope
//! that also carries the total number of matching items.
//!
//! Page sizes are bounded: [`PageRequest::clamp_limit`] caps the limit at a
//! configured ceiling so a single request cannot ask the store for an
//! unbounded number of documents.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling applied to page sizes when none is configured.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are one-based; zero is rejected.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be at least 1")]
    ZeroLimit,
}

/// Validated one-based page request.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit >= 1`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 20).expect("valid request");
/// let window = request.window();
/// assert_eq!(window.skip(), 40);
/// assert_eq!(window.take(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate and construct a page request.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when `page` or `limit` is zero.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Cap the page size at `max_limit` (itself raised to at least one).
    #[must_use]
    pub fn clamp_limit(self, max_limit: u32) -> Self {
        Self {
            page: self.page,
            limit: self.limit.min(max_limit.max(1)),
        }
    }

    /// Translate the request into a skip/take window.
    ///
    /// `skip = (page - 1) * limit`, saturating at `u64::MAX`.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        let take = u64::from(self.limit);
        let skip = u64::from(self.page - 1).saturating_mul(take);
        PageWindow { skip, take }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PageRequestDto {
    page: u32,
    limit: u32,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            page: value.page,
            limit: value.limit,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.page, value.limit)
    }
}

/// Skip/take pair handed to a document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    skip: u64,
    take: u64,
}

impl PageWindow {
    /// Number of matching documents to skip.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.skip
    }

    /// Maximum number of documents to return.
    #[must_use]
    pub const fn take(&self) -> u64 {
        self.take
    }
}

/// One page of results together with the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    limit: u32,
    total: u64,
}

impl<T> Page<T> {
    /// Wrap `items` fetched for `request` alongside the unpaginated `total`.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Effective page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Total matches across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages needed to list every match.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }

    /// Whether a later page holds further matches.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page validation and window arithmetic.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, PageRequestError::ZeroPage)]
    #[case(1, 0, PageRequestError::ZeroLimit)]
    #[case(0, 0, PageRequestError::ZeroPage)]
    fn rejects_zero_values(#[case] page: u32, #[case] limit: u32, #[case] expected: PageRequestError) {
        assert_eq!(PageRequest::new(page, limit), Err(expected));
    }

    #[rstest]
    #[case(1, 10, 0, 10)]
    #[case(2, 10, 10, 10)]
    #[case(5, 3, 12, 3)]
    fn window_skips_previous_pages(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] skip: u64,
        #[case] take: u64,
    ) {
        let window = PageRequest::new(page, limit).expect("valid request").window();
        assert_eq!((window.skip(), window.take()), (skip, take));
    }

    #[rstest]
    fn window_does_not_overflow_for_extreme_pages() {
        let window = PageRequest::new(u32::MAX, u32::MAX)
            .expect("valid request")
            .window();
        assert_eq!(
            window.skip(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }

    #[rstest]
    #[case(500, 100, 100)]
    #[case(20, 100, 20)]
    #[case(20, 0, 1)]
    fn clamp_limit_caps_page_size(#[case] limit: u32, #[case] max: u32, #[case] expected: u32) {
        let request = PageRequest::new(2, limit).expect("valid request").clamp_limit(max);
        assert_eq!(request.limit(), expected);
        assert_eq!(request.page(), 2);
    }

    #[rstest]
    fn clamped_window_uses_clamped_limit() {
        let window = PageRequest::new(3, 1_000)
            .expect("valid request")
            .clamp_limit(DEFAULT_MAX_PAGE_SIZE)
            .window();
        assert_eq!(window.skip(), 200);
        assert_eq!(window.take(), 100);
    }

    #[rstest]
    #[case(0, 10, 0, false)]
    #[case(25, 10, 3, true)]
    #[case(30, 10, 3, true)]
    #[case(5, 10, 1, false)]
    fn page_reports_total_pages(
        #[case] total: u64,
        #[case] limit: u32,
        #[case] pages: u64,
        #[case] has_next: bool,
    ) {
        let request = PageRequest::new(1, limit).expect("valid request");
        let page: Page<u8> = Page::new(Vec::new(), request, total);
        assert_eq!(page.total_pages(), pages);
        assert_eq!(page.has_next(), has_next);
    }

    #[rstest]
    fn page_request_deserialisation_validates() {
        let err = serde_json::from_str::<PageRequest>(r#"{"page":0,"limit":5}"#)
            .expect_err("zero page rejected");
        assert!(err.to_string().contains("page must be at least 1"));

        let request: PageRequest =
            serde_json::from_str(r#"{"page":2,"limit":5}"#).expect("valid request");
        assert_eq!(request, PageRequest::new(2, 5).expect("valid request"));
    }

    #[rstest]
    fn page_serialises_with_camel_case_keys() {
        let request = PageRequest::new(1, 2).expect("valid request");
        let page = Page::new(vec!["a", "b"], request, 7);
        let json = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(
            json,
            serde_json::json!({ "items": ["a", "b"], "page": 1, "limit": 2, "total": 7 })
        );
    }
}

//! Typed query construction shared by the repositories.
//!
//! Repositories never hand raw store documents around; they build a
//! [`Filter`] and a [`PageWindow`] here and let the persistence adapter
//! translate them into whatever the backing store understands.

use chrono::{DateTime, Utc};
use pagination::{PageRequest, PageWindow};

use super::{Identifier, ReportWindow};

/// Predicate selecting documents for find, count, update and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches the document with this identifier.
    IdEquals(Identifier),
    /// Case-insensitive literal substring match on the name field.
    NameContains(String),
    /// Exact match on the status field.
    StatusEquals(String),
    /// Creation instant within `[start, end]`.
    CreatedBetween {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Filter {
    pub const fn by_id(id: Identifier) -> Self {
        Self::IdEquals(id)
    }

    pub const fn by_date_range(window: &ReportWindow) -> Self {
        Self::CreatedBetween {
            start: window.start(),
            end: window.end(),
        }
    }
}

/// Product search filter. Blank terms match everything.
///
/// # Examples
/// ```
/// use storefront::domain::{Filter, build_search_filter};
///
/// assert_eq!(build_search_filter("  "), Filter::All);
/// assert_eq!(
///     build_search_filter("ham"),
///     Filter::NameContains("ham".to_owned())
/// );
/// ```
pub fn build_search_filter(term: &str) -> Filter {
    if term.trim().is_empty() {
        Filter::All
    } else {
        Filter::NameContains(term.to_owned())
    }
}

/// Order status filter. Blank statuses match everything.
pub fn build_status_filter(status: &str) -> Filter {
    if status.trim().is_empty() {
        Filter::All
    } else {
        Filter::StatusEquals(status.to_owned())
    }
}

/// Skip/take window for `request`, with the page size capped at `max_page_size`.
pub fn build_page(request: PageRequest, max_page_size: u32) -> PageWindow {
    request.clamp_limit(max_page_size).window()
}

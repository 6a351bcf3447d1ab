//! Pagination types
//!
//! Defines the page cursor and the search response envelope.

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Hard cap on how many items one page may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// The `{size, from}` pair identifying the next slice of a result set.
///
/// Owned by the scroller; callers never see or mutate one mid-flight.
/// `from` always equals the number of items yielded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    /// Items requested for the next page.
    pub size: u64,
    /// Offset of the next page's first item.
    pub from: u64,
}

impl PageCursor {
    /// Cursor for the next page, given progress so far.
    ///
    /// The size never exceeds [`MAX_PAGE_SIZE`] and shrinks to whatever
    /// is still owed once a limit gets close.
    pub(crate) fn next(yielded: u64, left_to_return: u64) -> Self {
        Self {
            size: left_to_return.min(MAX_PAGE_SIZE),
            from: yielded,
        }
    }
}

/// One page of a search response.
///
/// Any other fields the server includes (profiling, aggregations) are
/// ignored here; callers wanting them should query the endpoint directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    /// Items in this page. A missing or empty list ends iteration.
    #[serde(default)]
    pub list: Option<Vec<JsonValue>>,
    /// Server signal to stop paging once this page is consumed.
    #[serde(default, rename = "break")]
    pub stop: Option<bool>,
}

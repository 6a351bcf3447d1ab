//! Pagination module
//!
//! Lazy iteration over paged search endpoints.
//!
//! # Overview
//!
//! Search endpoints answer in pages of at most [`MAX_PAGE_SIZE`] items.
//! The [`SearchScroller`] owns the page cursor, injects it into the search
//! body before every request, and yields decoded items one at a time until
//! the server runs out, signals a stop, or a caller-supplied limit is
//! reached.

mod scroller;
mod types;

pub use scroller::SearchScroller;
pub use types::{PageCursor, SearchPage, MAX_PAGE_SIZE};

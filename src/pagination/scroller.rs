//! Search result scroller
//!
//! Implements the lazy iteration contract over paged search endpoints.

use super::types::{PageCursor, SearchPage};
use crate::error::{Error, Result};
use crate::http::BoonClient;
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::marker::PhantomData;
use tracing::debug;

/// Lazy, finite, non-restartable stream of search results.
///
/// Pages are fetched on demand: no request happens until the first call
/// to `next()`, and each page fetch blocks the calling thread. Items
/// decode into `T` as they are yielded.
///
/// Iteration ends when the server returns a missing or empty item list,
/// sets the stop flag on a page, or the configured limit is exhausted.
/// A limit reached mid-page never cuts that page short; it only prevents
/// further fetches. Dropping the scroller abandons the cursor; a partly
/// consumed search cannot be resumed.
///
/// On a transport or decode failure the error is yielded once and the
/// scroller is finished.
pub struct SearchScroller<'a, T> {
    client: &'a BoonClient,
    endpoint: String,
    search: JsonValue,
    left_to_return: u64,
    page: u64,
    yielded: u64,
    buffer: VecDeque<JsonValue>,
    done: bool,
    _marker: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> SearchScroller<'a, T> {
    pub(crate) fn new(
        client: &'a BoonClient,
        endpoint: &str,
        search: JsonValue,
        limit: Option<u64>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            search,
            left_to_return: limit.unwrap_or(u64::MAX),
            page: 0,
            yielded: 0,
            buffer: VecDeque::new(),
            done: false,
            _marker: PhantomData,
        }
    }

    /// Number of page requests issued so far.
    pub fn pages_fetched(&self) -> u64 {
        self.page
    }

    /// Fetch the next page, advancing the cursor first.
    ///
    /// `from` is the count of items already yielded, so pages the server
    /// over- or under-fills do not skew later offsets.
    fn fetch_next_page(&mut self) -> Result<SearchPage> {
        self.page += 1;
        let cursor = PageCursor::next(self.yielded, self.left_to_return);
        self.search["page"] = serde_json::to_value(cursor)?;
        debug!(
            "Search page {} of {}: size {} from {}",
            self.page, self.endpoint, cursor.size, cursor.from
        );
        self.client.post(&self.endpoint, Some(&self.search))
    }
}

impl<T: DeserializeOwned> Iterator for SearchScroller<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain the buffered page before anything else, so a limit
            // reached mid-page still delivers the rest of that page.
            if let Some(raw) = self.buffer.pop_front() {
                self.yielded += 1;
                self.left_to_return = self.left_to_return.saturating_sub(1);
                return Some(match serde_json::from_value(raw) {
                    Ok(item) => Ok(item),
                    Err(err) => {
                        self.buffer.clear();
                        self.done = true;
                        Err(Error::from(err))
                    }
                });
            }

            if self.done || self.left_to_return == 0 {
                self.done = true;
                return None;
            }

            let page = match self.fetch_next_page() {
                Ok(page) => page,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };

            if page.stop.unwrap_or(false) {
                self.done = true;
            }
            let items = page.list.unwrap_or_default();
            if items.is_empty() {
                self.done = true;
                return None;
            }
            self.buffer.extend(items);
        }
    }
}

impl<T> std::fmt::Debug for SearchScroller<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchScroller")
            .field("endpoint", &self.endpoint)
            .field("page", &self.page)
            .field("yielded", &self.yielded)
            .field("left_to_return", &self.left_to_return)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

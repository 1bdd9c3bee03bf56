//! Page generator implementations
//!
//! Each pager owns the state of one paginated walk and exposes it both as an
//! explicit `next_page` step and as a lazy `Stream` of pages.

use super::types::{CursorPage, NumberedPage, Page};
use crate::error::{Error, Result};
use crate::models::Timestamped;
use crate::types::now_millis;
use futures::stream::{self, Stream, TryStreamExt};
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

// ============================================================================
// Numbered Pagination
// ============================================================================

/// Walks an endpoint page by page using explicit page numbers
///
/// After each page, `has_more_pages` on that page decides whether another
/// request is made. An undecidable answer ends the walk.
pub struct NumberedPager<F> {
    fetch: F,
    page_number: u32,
    page_size: Option<u32>,
    done: bool,
}

impl<F> NumberedPager<F> {
    /// Create a pager starting at `start_page`
    pub fn new(fetch: F, start_page: u32, page_size: Option<u32>) -> Self {
        Self {
            fetch,
            page_number: start_page,
            page_size,
            done: false,
        }
    }

    /// Page number of the next request
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Record a fetched page and decide whether to continue
    pub fn advance<T>(&mut self, page: &NumberedPage<T>) {
        if page.has_more_pages() == Some(true) {
            self.page_number += 1;
        } else {
            self.done = true;
        }
    }

    /// Fetch the next page, or `None` once the walk is over
    pub async fn next_page<T, Fut>(&mut self) -> Result<Option<NumberedPage<T>>>
    where
        F: FnMut(u32, Option<u32>) -> Fut,
        Fut: Future<Output = Result<NumberedPage<T>>>,
    {
        if self.done {
            return Ok(None);
        }

        debug!(
            page_number = self.page_number,
            page_size = ?self.page_size,
            "Fetching numbered page"
        );
        let page = match (self.fetch)(self.page_number, self.page_size).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        self.advance(&page);
        Ok(Some(page))
    }

    /// Turn the pager into a lazy stream of pages
    pub fn into_stream<T, Fut>(self) -> impl Stream<Item = Result<NumberedPage<T>>>
    where
        F: FnMut(u32, Option<u32>) -> Fut,
        Fut: Future<Output = Result<NumberedPage<T>>>,
    {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await;
            page.map(|page| page.map(|page| (page, pager)))
        })
    }
}

impl<F> fmt::Debug for NumberedPager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberedPager")
            .field("page_number", &self.page_number)
            .field("page_size", &self.page_size)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T> NumberedPage<T> {
    /// Lazy stream of pages from a page-number endpoint
    ///
    /// `fetch` receives `(page_number, page_size)`.
    pub fn page_stream<F, Fut>(
        fetch: F,
        start_page: u32,
        page_size: Option<u32>,
    ) -> impl Stream<Item = Result<NumberedPage<T>>>
    where
        F: FnMut(u32, Option<u32>) -> Fut,
        Fut: Future<Output = Result<NumberedPage<T>>>,
    {
        NumberedPager::new(fetch, start_page, page_size).into_stream()
    }
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Walks an endpoint by following opaque continuation cursors
pub struct CursorPager<F> {
    fetch: F,
    cursor: Option<String>,
    done: bool,
}

impl<F> CursorPager<F> {
    /// Create a pager; `None` requests the server's first page
    pub fn new(fetch: F, cursor: Option<String>) -> Self {
        Self {
            fetch,
            cursor,
            done: false,
        }
    }

    /// Cursor the next request will send
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Record a fetched page; its own next cursor decides termination
    pub fn advance<T>(&mut self, page: &CursorPage<T>) {
        match page.next_cursor() {
            Some(cursor) => self.cursor = Some(cursor.to_string()),
            None => {
                self.cursor = None;
                self.done = true;
            }
        }
    }

    /// Fetch the next page, or `None` once the walk is over
    pub async fn next_page<T, Fut>(&mut self) -> Result<Option<CursorPage<T>>>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<CursorPage<T>>>,
    {
        if self.done {
            return Ok(None);
        }

        debug!(cursor = ?self.cursor, "Fetching cursor page");
        let page = match (self.fetch)(self.cursor.clone()).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        self.advance(&page);
        Ok(Some(page))
    }

    /// Turn the pager into a lazy stream of pages
    pub fn into_stream<T, Fut>(self) -> impl Stream<Item = Result<CursorPage<T>>>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<CursorPage<T>>>,
    {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await;
            page.map(|page| page.map(|page| (page, pager)))
        })
    }
}

impl<F> fmt::Debug for CursorPager<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorPager")
            .field("cursor", &self.cursor)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T> CursorPage<T> {
    /// Lazy stream of pages from a cursor endpoint
    pub fn page_stream<F, Fut>(
        fetch: F,
        cursor: Option<String>,
    ) -> impl Stream<Item = Result<CursorPage<T>>>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<CursorPage<T>>>,
    {
        CursorPager::new(fetch, cursor).into_stream()
    }
}

// ============================================================================
// Time Window Pagination
// ============================================================================

/// The `[from_time, to_time)` interval of the next request, in epoch millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Lower bound; `None` means unbounded
    pub from_time: Option<i64>,
    /// Exclusive upper bound
    pub to_time: i64,
}

impl TimeWindow {
    pub fn new(from_time: Option<i64>, to_time: i64) -> Self {
        Self { from_time, to_time }
    }

    /// Whether the window still covers any time
    pub fn is_open(&self) -> bool {
        self.from_time.map_or(true, |from| self.to_time > from)
    }
}

/// Walks an endpoint that pages implicitly through a shrinking time window
///
/// After each page, `advance` maps the page's items and the current upper
/// bound to the next upper bound. The upper bound only ever moves backward; an
/// `advance` result that does not lower it ends the walk.
pub struct TimeWindowPager<F, A> {
    fetch: F,
    advance: A,
    window: TimeWindow,
    done: bool,
}

impl<F, A> TimeWindowPager<F, A> {
    /// Create a pager; `to_time` defaults to now
    pub fn new(fetch: F, advance: A, from_time: Option<i64>, to_time: Option<i64>) -> Self {
        Self {
            fetch,
            advance,
            window: TimeWindow::new(from_time, to_time.unwrap_or_else(now_millis)),
            done: false,
        }
    }

    /// Window of the next request
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn is_done(&self) -> bool {
        self.done || !self.window.is_open()
    }

    /// Fetch the next page, or `None` once the window is exhausted
    pub async fn next_page<P, Fut>(&mut self) -> Result<Option<P>>
    where
        P: Page,
        F: FnMut(Option<i64>, i64) -> Fut,
        Fut: Future<Output = Result<P>>,
        A: FnMut(&[P::Item], i64) -> i64,
    {
        if self.is_done() {
            self.done = true;
            return Ok(None);
        }

        let TimeWindow { from_time, to_time } = self.window;
        debug!(from_time = ?from_time, to_time, "Fetching time window page");
        let page = match (self.fetch)(from_time, to_time).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        let next_to_time = (self.advance)(page.items(), to_time);
        if next_to_time >= to_time {
            warn!(
                to_time,
                next_to_time, "Time window did not move backward, stopping pagination"
            );
            self.done = true;
        } else {
            self.window.to_time = next_to_time;
        }

        Ok(Some(page))
    }

    /// Turn the pager into a lazy stream of pages
    pub fn into_stream<P, Fut>(self) -> impl Stream<Item = Result<P>>
    where
        P: Page,
        F: FnMut(Option<i64>, i64) -> Fut,
        Fut: Future<Output = Result<P>>,
        A: FnMut(&[P::Item], i64) -> i64,
    {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await;
            page.map(|page| page.map(|page| (page, pager)))
        })
    }
}

impl<F, A> fmt::Debug for TimeWindowPager<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeWindowPager")
            .field("window", &self.window)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Standard window policy for endpoints sorted by timestamp
///
/// A page with timestamps moves the upper bound to one millisecond before the
/// earliest timestamp seen. An empty page (or one without timestamps) moves it
/// back by `empty_step`.
pub fn step_back_policy<T: Timestamped>(empty_step: i64) -> impl Fn(&[T], i64) -> i64 + Clone {
    move |items: &[T], to_time: i64| {
        match items.iter().filter_map(Timestamped::timestamp_millis).min() {
            Some(earliest) => earliest.saturating_sub(1),
            None => to_time.saturating_sub(empty_step),
        }
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// Flatten a stream of pages into a stream of their items
///
/// Items come out in page order, then in order within each page. The next page
/// is only requested once the current one is drained.
pub fn flatten_pages<S, P>(pages: S) -> impl Stream<Item = Result<P::Item>>
where
    S: Stream<Item = Result<P>>,
    P: Page,
{
    pages
        .map_ok(|page| stream::iter(page.into_items().into_iter().map(Ok::<_, Error>)))
        .try_flatten()
}

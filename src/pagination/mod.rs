//! Pagination module
//!
//! Supports: Page Number, Cursor, Time Window
//!
//! # Overview
//!
//! The pagination module turns a page-fetch function into a lazy, single-pass
//! `Stream` of pages, and flattens page streams into item streams. Each pager
//! owns its own state (page number, cursor, or time window), so independent
//! pagers never need coordination.
//!
//! Fetch errors end a stream: the error is yielded once and nothing follows.

mod strategies;
mod types;

pub use strategies::{
    flatten_pages, step_back_policy, CursorPager, NumberedPager, TimeWindow, TimeWindowPager,
};
pub use types::{CursorPage, NumberedPage, Page, ResponseMetadata};

//! # TruSTAR API client
//!
//! An async client for the TruSTAR threat-intelligence REST API: report
//! submission and retrieval, correlation, search, and indicator summaries.
//!
//! ## Features
//!
//! - **Lazy pagination**: Paginated endpoints are exposed as `Stream`s that
//!   fetch the next page only when the current one is drained
//! - **Three paging styles**: Numbered pages, opaque cursors, and time windows
//!   walked backwards from newest to oldest
//! - **Client credentials auth**: Tokens are cached and refreshed on expiry
//! - **Retry and rate limiting**: Backoff on 429 and 5xx, token-bucket limits
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use trustar::{Report, ReportFilter, TruStar, TruStarConfig};
//!
//! #[tokio::main]
//! async fn main() -> trustar::Result<()> {
//!     let client = TruStar::new(TruStarConfig::load("trustar.yaml", "trustar")?)?;
//!
//!     let report = client
//!         .submit_report(Report::new("Phishing", "Suspect mail from evil.com"))
//!         .await?;
//!     println!("{}", client.get_report_deeplink(report.id.as_deref().unwrap_or_default()));
//!
//!     let reports: Vec<Report> = client
//!         .get_reports(ReportFilter::new().enclave(true))
//!         .try_collect()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      TruStar client                      │
//! │  reports · correlation · search · indicator summaries    │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────┬──────────────┴──────┬──────────────────────┐
//! │    Auth     │        HTTP         │      Pagination      │
//! ├─────────────┼─────────────────────┼──────────────────────┤
//! │ Bearer      │ Retry / backoff     │ NumberedPage         │
//! │ Client      │ Rate limit          │ CursorPage           │
//! │ credentials │ Timeouts            │ Time window          │
//! └─────────────┴─────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::ref_option)]
#![allow(clippy::struct_excessive_bools)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Domain models
pub mod models;

/// Page types and pagination strategies
pub mod pagination;

/// Client configuration
pub mod config;

/// API client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{CorrelationQuery, ProvidedSubmission, ReportFilter, SearchQuery, TruStar};
pub use config::TruStarConfig;
pub use error::{Error, Result};
pub use models::{
    IndicatorSummary, Model, RedactedReport, Report, ReportStatus, SubmissionStatus, Timestamped,
};
pub use pagination::{CursorPage, NumberedPage, Page};
pub use types::{DistributionType, IdType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! TruSTAR API client
//!
//! `TruStar` wraps an authenticated `HttpClient` and exposes the report and
//! indicator endpoints. Paginated endpoints come in two forms: a `*_page`
//! method returning one page, and a method returning a lazy `Stream` of items
//! that fetches further pages as it is polled.
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use trustar::{ReportFilter, TruStar, TruStarConfig};
//!
//! let client = TruStar::new(TruStarConfig::load("trustar.yaml", "trustar")?)?;
//! let reports: Vec<_> = client
//!     .get_reports(ReportFilter::new().enclave(true))
//!     .try_collect()
//!     .await?;
//! ```

mod indicators;
mod reports;
mod types;

pub use types::{CorrelationQuery, ProvidedSubmission, ReportFilter, SearchQuery};

use crate::config::TruStarConfig;
use crate::error::Result;
use crate::http::HttpClient;
use std::path::Path;
use tracing::debug;

/// Client for the TruSTAR REST API
pub struct TruStar {
    http: HttpClient,
    config: TruStarConfig,
}

impl TruStar {
    /// Create a client authenticating with the configured API credentials
    pub fn new(config: TruStarConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::with_auth(config.http_client_config(), config.auth_config()?)?;
        debug!(api_endpoint = %config.api_endpoint, "Created TruSTAR client");
        Ok(Self { http, config })
    }

    /// Create a client over an already configured transport
    pub fn with_http_client(config: TruStarConfig, http: HttpClient) -> Self {
        Self { http, config }
    }

    /// Load the `role` section of a config file and create a client
    pub fn from_config_file(path: impl AsRef<Path>, role: &str) -> Result<Self> {
        Self::new(TruStarConfig::load(path, role)?)
    }

    pub fn config(&self) -> &TruStarConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Explicit enclaves, else the configured ones (if any)
    fn enclave_ids_or_default<'a>(&'a self, explicit: Option<&'a [String]>) -> Option<&'a [String]> {
        explicit.or_else(|| {
            Some(self.config.enclave_ids.as_slice()).filter(|ids| !ids.is_empty())
        })
    }
}

impl std::fmt::Debug for TruStar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TruStar")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;

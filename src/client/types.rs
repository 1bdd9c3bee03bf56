//! Query parameter types for the report and indicator endpoints

use crate::models::Report;

// ============================================================================
// Report Filter
// ============================================================================

/// Filters for listing reports by time window
///
/// Unset fields are not sent, except `enclave_ids`, which falls back to the
/// enclaves configured on the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Restrict to enclave (`true`) or community (`false`) reports
    pub is_enclave: Option<bool>,
    pub enclave_ids: Option<Vec<String>>,
    /// Only reports carrying all of these tags
    pub tags: Option<Vec<String>>,
    /// Drop reports carrying any of these tags
    pub excluded_tags: Option<Vec<String>>,
    /// Lower bound in epoch millis
    pub from_time: Option<i64>,
    /// Upper bound in epoch millis; now when unset
    pub to_time: Option<i64>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to enclave or community reports
    #[must_use]
    pub fn enclave(mut self, is_enclave: bool) -> Self {
        self.is_enclave = Some(is_enclave);
        self
    }

    #[must_use]
    pub fn with_enclave_ids(mut self, enclave_ids: Vec<String>) -> Self {
        self.enclave_ids = Some(enclave_ids);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn with_excluded_tags(mut self, tags: Vec<String>) -> Self {
        self.excluded_tags = Some(tags);
        self
    }

    /// Set the time window
    #[must_use]
    pub fn between(mut self, from_time: Option<i64>, to_time: Option<i64>) -> Self {
        self.from_time = from_time;
        self.to_time = to_time;
        self
    }
}

// ============================================================================
// Search Query
// ============================================================================

/// Full-text report search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// At least 3 characters; unset or empty matches everything
    pub search_term: Option<String>,
    pub enclave_ids: Option<Vec<String>>,
    pub from_time: Option<i64>,
    pub to_time: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub excluded_tags: Option<Vec<String>>,
}

impl SearchQuery {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: Some(search_term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_enclave_ids(mut self, enclave_ids: Vec<String>) -> Self {
        self.enclave_ids = Some(enclave_ids);
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn with_excluded_tags(mut self, tags: Vec<String>) -> Self {
        self.excluded_tags = Some(tags);
        self
    }

    #[must_use]
    pub fn between(mut self, from_time: Option<i64>, to_time: Option<i64>) -> Self {
        self.from_time = from_time;
        self.to_time = to_time;
        self
    }
}

// ============================================================================
// Correlation Query
// ============================================================================

/// Reports that contain any of a set of indicator values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationQuery {
    pub indicators: Vec<String>,
    pub enclave_ids: Option<Vec<String>>,
    /// Search enclave reports (default) or community reports
    pub is_enclave: bool,
}

impl CorrelationQuery {
    pub fn new(indicators: Vec<String>) -> Self {
        Self {
            indicators,
            enclave_ids: None,
            is_enclave: true,
        }
    }

    #[must_use]
    pub fn with_enclave_ids(mut self, enclave_ids: Vec<String>) -> Self {
        self.enclave_ids = Some(enclave_ids);
        self
    }

    /// Search community reports instead of enclave reports
    #[must_use]
    pub fn community(mut self) -> Self {
        self.is_enclave = false;
        self
    }
}

// ============================================================================
// Copy Edits
// ============================================================================

/// Replacement content for a report copy
///
/// When supplied, the copy takes all of its fields and tags from here rather
/// than from the source report. Partial edits are not possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedSubmission {
    pub report: Report,
    /// Must not be empty
    pub tags: Vec<String>,
}

impl ProvidedSubmission {
    pub fn new(report: Report, tags: Vec<String>) -> Self {
        Self { report, tags }
    }
}

//! Common types used throughout the client
//!
//! This module contains shared type definitions, type aliases,
//! and small time utilities used across multiple modules.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Distribution / ID Types
// ============================================================================

/// Whether a report lives in a private enclave or the shared community pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DistributionType {
    #[default]
    Enclave,
    Community,
}

impl DistributionType {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            DistributionType::Enclave => "ENCLAVE",
            DistributionType::Community => "COMMUNITY",
        }
    }

    pub fn from_is_enclave(is_enclave: bool) -> Self {
        if is_enclave {
            DistributionType::Enclave
        } else {
            DistributionType::Community
        }
    }
}

// Anything other than COMMUNITY (any case) is an enclave report.
impl<'de> Deserialize<'de> for DistributionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw.eq_ignore_ascii_case("COMMUNITY") {
            DistributionType::Community
        } else {
            DistributionType::Enclave
        })
    }
}

/// Whether a report id is TruSTAR's internal id or a caller-provided external id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdType {
    #[default]
    Internal,
    External,
}

impl IdType {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            IdType::Internal => "INTERNAL",
            IdType::External => "EXTERNAL",
        }
    }
}

// ============================================================================
// Time
// ============================================================================

/// One day in milliseconds
pub const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse an ISO-8601 timestamp into milliseconds since the epoch.
///
/// Accepts RFC 3339 strings with an offset, and naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// strings which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

//! Entity definitions
//!
//! Field names follow the API's camelCase wire format.

use super::{Model, Timestamped};
use crate::types::{parse_timestamp, DistributionType, JsonValue};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Report
// ============================================================================

/// An incident report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report guid, assigned on submission
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "reportBody", default)]
    pub body: Option<String>,
    /// When the incident began (milliseconds since epoch)
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub time_began: Option<i64>,
    /// Tracking id in some external system
    #[serde(rename = "externalTrackingId", default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub distribution_type: DistributionType,
    #[serde(default, deserialize_with = "deserialize_string_or_list")]
    pub enclave_ids: Option<Vec<String>>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
}

impl Report {
    /// Create an enclave report with a title and body
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    /// Set the enclaves the report belongs to
    #[must_use]
    pub fn with_enclave_ids(mut self, ids: Vec<String>) -> Self {
        self.enclave_ids = Some(ids);
        self
    }

    /// Mark the report as a community report
    #[must_use]
    pub fn community(mut self) -> Self {
        self.distribution_type = DistributionType::Community;
        self
    }

    /// Set the incident start time
    #[must_use]
    pub fn with_time_began(mut self, millis: i64) -> Self {
        self.time_began = Some(millis);
        self
    }

    /// Set the external tracking id
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Whether the report is distributed to enclaves
    pub fn is_enclave(&self) -> bool {
        self.distribution_type == DistributionType::Enclave
    }
}

impl Model for Report {}

impl Timestamped for Report {
    fn timestamp_millis(&self) -> Option<i64> {
        self.updated
    }
}

// ============================================================================
// Redacted Report
// ============================================================================

/// Response of the redaction endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedactedReport {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "reportBody", default)]
    pub body: Option<String>,
}

impl Model for RedactedReport {}

// ============================================================================
// Report Status
// ============================================================================

/// Processing state of a submitted report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    SubmissionProcessing,
    SubmissionSuccess,
    SubmissionFailure,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Response of the report status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub status: SubmissionStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Model for ReportStatus {}

// ============================================================================
// Indicator Summaries
// ============================================================================

/// Normalized summary of what one intelligence source says about an indicator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSummary {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub indicator_type: Option<String>,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub enclave_id: Option<String>,
    #[serde(default)]
    pub source: Option<IntelligenceSource>,
    #[serde(default)]
    pub score: Option<IndicatorScore>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub attributes: Vec<IndicatorAttribute>,
    /// 0 (lowest) to 3 (highest), when the source carries a score
    #[serde(default)]
    pub severity_level: Option<u8>,
}

impl Model for IndicatorSummary {}

impl Timestamped for IndicatorSummary {
    fn timestamp_millis(&self) -> Option<i64> {
        self.updated
    }
}

/// Score attached by a source, e.g. "Risk Score"
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorScore {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl Model for IndicatorScore {}

/// Source-specific attribute of an indicator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorAttribute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: JsonValue,
    /// How to interpret `value`, e.g. "timestamp"
    #[serde(default)]
    pub logical_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Model for IndicatorAttribute {}

/// An intelligence source, e.g. `virustotal`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntelligenceSource {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Model for IntelligenceSource {}

// ============================================================================
// Deserialization helpers
// ============================================================================

/// `null` decodes to the type's default
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// Integer millis or an ISO-8601 string
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimestamp::Millis(millis)) => Ok(Some(millis)),
        Some(RawTimestamp::Text(text)) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{text}'"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

/// A lone string is promoted to a one-element list
fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrList>::deserialize(deserializer)?.map(|raw| match raw {
            StringOrList::One(id) => vec![id],
            StringOrList::Many(ids) => ids,
        }),
    )
}

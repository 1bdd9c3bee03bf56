//! Domain models
//!
//! Every entity returned by the API implements [`Model`], the capability the
//! pagination layer uses to turn raw page items into typed values.
//!
//! # Overview
//!
//! - `Report`, `RedactedReport`, `ReportStatus` - report endpoints
//! - `IndicatorSummary` and its parts - indicator summary endpoint
//! - [`Timestamped`] - exposes the timestamp time-window paging steps back from

mod types;

pub use types::{
    IndicatorAttribute, IndicatorScore, IndicatorSummary, IntelligenceSource, RedactedReport,
    Report, ReportStatus, SubmissionStatus,
};

use crate::error::Result;
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Conversion between an entity and its JSON wire representation
pub trait Model: Serialize + DeserializeOwned {
    /// Serialize to a JSON value, optionally dropping `null` fields
    fn to_value(&self, remove_nones: bool) -> Result<JsonValue> {
        let mut value = serde_json::to_value(self)?;
        if remove_nones {
            strip_nulls(&mut value);
        }
        Ok(value)
    }

    /// Deserialize from a JSON value
    fn from_value(raw: JsonValue) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }
}

/// Untyped items pass through unchanged
impl Model for JsonValue {}

/// Entities carrying the timestamp used to step a time window backward
pub trait Timestamped {
    /// Milliseconds since the Unix epoch, if known
    fn timestamp_millis(&self) -> Option<i64>;
}

/// Recursively remove `null` entries from objects
pub fn strip_nulls(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                strip_nulls(v);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests;

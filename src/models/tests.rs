//! Tests for the models module

use super::*;
use crate::types::DistributionType;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Report Tests
// ============================================================================

#[test]
fn test_report_from_value() {
    let report = Report::from_value(json!({
        "id": "1a09f14b-ef8c-443f-b082-9643071c522a",
        "created": 1515571633505_i64,
        "updated": 1515620420062_i64,
        "reportBody": "Employee reported suspect email.",
        "title": "Phishing Incident",
        "enclaveIds": ["ac6a0d17-7350-4410-bc57-9699521db992"],
        "distributionType": "ENCLAVE",
        "timeBegan": 1479941278000_i64
    }))
    .unwrap();

    assert_eq!(
        report,
        Report {
            id: Some("1a09f14b-ef8c-443f-b082-9643071c522a".to_string()),
            title: Some("Phishing Incident".to_string()),
            body: Some("Employee reported suspect email.".to_string()),
            time_began: Some(1_479_941_278_000),
            external_id: None,
            external_url: None,
            distribution_type: DistributionType::Enclave,
            enclave_ids: Some(vec!["ac6a0d17-7350-4410-bc57-9699521db992".to_string()]),
            created: Some(1_515_571_633_505),
            updated: Some(1_515_620_420_062),
        }
    );
    assert!(report.is_enclave());
    assert_eq!(report.timestamp_millis(), Some(1_515_620_420_062));
}

#[test]
fn test_report_lenient_fields() {
    let report = Report::from_value(json!({
        "title": "t",
        "distributionType": "community",
        "enclaveIds": "single-enclave",
        "timeBegan": "2018-01-10T08:07:13Z"
    }))
    .unwrap();

    assert!(!report.is_enclave());
    assert_eq!(report.enclave_ids, Some(vec!["single-enclave".to_string()]));
    assert_eq!(report.time_began, Some(1_515_571_633_000));
}

#[test]
fn test_report_missing_distribution_defaults_to_enclave() {
    let report = Report::from_value(json!({"title": "t", "distributionType": null})).unwrap();
    assert_eq!(report.distribution_type, DistributionType::Enclave);
}

#[test]
fn test_report_invalid_time_began() {
    let result = Report::from_value(json!({"timeBegan": "last tuesday"}));
    assert!(result.is_err());
}

#[test]
fn test_report_to_value() {
    let report = Report::new("Suspicious Activity", "body text")
        .with_enclave_ids(vec!["e1".to_string()])
        .with_time_began(1000)
        .with_external_id("ext-1");

    let value = report.to_value(false).unwrap();
    assert_eq!(value["title"], "Suspicious Activity");
    assert_eq!(value["reportBody"], "body text");
    assert_eq!(value["distributionType"], "ENCLAVE");
    assert_eq!(value["externalTrackingId"], "ext-1");
    assert_eq!(value["timeBegan"], 1000);
    assert!(value["id"].is_null());

    let value = report.to_value(true).unwrap();
    assert!(value.get("id").is_none());
    assert!(value.get("externalUrl").is_none());
    assert_eq!(value["enclaveIds"], json!(["e1"]));
}

#[test]
fn test_report_round_trip() {
    let report = Report::new("title", "body")
        .community()
        .with_time_began(42);
    let back = Report::from_value(report.to_value(false).unwrap()).unwrap();
    assert_eq!(back, report);
}

// ============================================================================
// Other Entities
// ============================================================================

#[test]
fn test_redacted_report() {
    let redacted = RedactedReport::from_value(json!({
        "title": "[redacted]",
        "reportBody": "contact [redacted] for details"
    }))
    .unwrap();
    assert_eq!(redacted.title.as_deref(), Some("[redacted]"));
    assert_eq!(redacted.body.as_deref(), Some("contact [redacted] for details"));
}

#[test]
fn test_report_status() {
    let status = ReportStatus::from_value(json!({
        "id": "3f8824de-7858-4e07-b6d5-f02d020ee675",
        "status": "SUBMISSION_PROCESSING",
        "errorMessage": ""
    }))
    .unwrap();
    assert_eq!(status.status, SubmissionStatus::SubmissionProcessing);

    let status = ReportStatus::from_value(json!({"status": "SOMETHING_NEW"})).unwrap();
    assert_eq!(status.status, SubmissionStatus::Unknown);
}

#[test]
fn test_indicator_summary_nested() {
    let summary = IndicatorSummary::from_value(json!({
        "value": "e46ba4bd8a6af0b8ffe3f1b4b4d0b8b0",
        "type": "MD5",
        "reportId": "r1",
        "enclaveId": "e1",
        "source": {"key": "virustotal", "name": "VirusTotal"},
        "score": {"name": "Positives/Total Scans", "value": "50/60"},
        "created": 1_500_000_000_000_i64,
        "updated": 1_500_000_001_000_i64,
        "attributes": [
            {"name": "Malware Families", "value": ["Emotet"], "logicalType": null}
        ],
        "severityLevel": 3
    }))
    .unwrap();

    assert_eq!(summary.indicator_type.as_deref(), Some("MD5"));
    assert_eq!(
        summary.source,
        Some(IntelligenceSource {
            key: Some("virustotal".to_string()),
            name: Some("VirusTotal".to_string()),
        })
    );
    assert_eq!(summary.attributes.len(), 1);
    assert_eq!(summary.attributes[0].value, json!(["Emotet"]));
    assert_eq!(summary.severity_level, Some(3));
    assert_eq!(summary.timestamp_millis(), Some(1_500_000_001_000));
}

#[test]
fn test_indicator_summary_null_attributes() {
    let summary = IndicatorSummary::from_value(json!({"value": "x", "attributes": null})).unwrap();
    assert!(summary.attributes.is_empty());
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_strip_nulls_recursive() {
    let mut value = json!({
        "a": null,
        "b": {"c": null, "d": 1},
        "e": [{"f": null, "g": 2}, null]
    });
    strip_nulls(&mut value);
    assert_eq!(value, json!({"b": {"d": 1}, "e": [{"g": 2}, null]}));
}

#[test]
fn test_json_value_model_passthrough() {
    let raw = json!({"anything": [1, 2, 3]});
    let back = JsonValue::from_value(raw.clone()).unwrap();
    assert_eq!(back, raw);
}

//! Tests for the client module

use super::*;
use crate::error::Error;
use crate::models::{Report, SubmissionStatus};
use crate::types::{IdType, DAY_MILLIS};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{
    body_json, body_partial_json, header, method, path, query_param, query_param_is_missing,
};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ENCLAVES: [&str; 2] = ["e1", "e2"];

fn test_config(server: &MockServer) -> TruStarConfig {
    let mut config = TruStarConfig::new("key", "secret")
        .with_endpoints(format!("{}/oauth/token", server.uri()), server.uri())
        .with_station("https://station.example.com/")
        .with_requests_per_second(0);
    config.max_retries = 0;
    config
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, TruStar) {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let config = test_config(&server).with_enclave_ids(ENCLAVES.map(String::from).to_vec());
    let client = TruStar::new(config).unwrap();
    (server, client)
}

fn report_json(id: &str, updated: i64) -> Value {
    json!({"id": id, "title": format!("report {id}"), "updated": updated})
}

fn ids(reports: &[Report]) -> Vec<&str> {
    reports.iter().filter_map(|r| r.id.as_deref()).collect()
}

// ============================================================================
// Construction
// ============================================================================

#[tokio::test]
async fn test_new_rejects_missing_credentials() {
    let err = TruStar::new(TruStarConfig::default()).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[tokio::test]
async fn test_report_deeplink() {
    let (_server, client) = setup().await;
    assert_eq!(
        client.get_report_deeplink("fcda196b"),
        "https://station.example.com/constellation/reports/fcda196b"
    );
}

// ============================================================================
// Single Reports
// ============================================================================

#[tokio::test]
async fn test_get_report_details() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports/ext-42"))
        .and(query_param("idType", "EXTERNAL"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1a09f14b",
            "title": "Phishing Incident",
            "reportBody": "Employee reported suspect email.",
            "distributionType": "ENCLAVE",
            "enclaveIds": ["e1"],
            "timeBegan": 1479941278000_i64
        })))
        .mount(&server)
        .await;

    let report = client
        .get_report_details("ext-42", Some(IdType::External))
        .await
        .unwrap();

    assert_eq!(report.id.as_deref(), Some("1a09f14b"));
    assert_eq!(report.title.as_deref(), Some("Phishing Incident"));
    assert_eq!(report.time_began, Some(1_479_941_278_000));
}

#[tokio::test]
async fn test_get_report_details_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Report not found"))
        .mount(&server)
        .await;

    let err = client.get_report_details("nope", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_submit_report_fills_defaults() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .and(body_partial_json(json!({
            "title": "Suspicious Activity",
            "reportBody": "requests from 169.178.68.63",
            "distributionType": "ENCLAVE",
            "enclaveIds": ["e1", "e2"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ac6a0d17\n"))
        .expect(1)
        .mount(&server)
        .await;

    let before = crate::types::now_millis();
    let report = client
        .submit_report(Report::new("Suspicious Activity", "requests from 169.178.68.63"))
        .await
        .unwrap();

    assert_eq!(report.id.as_deref(), Some("ac6a0d17"));
    assert!(report.time_began.unwrap() >= before);
    assert_eq!(
        report.enclave_ids,
        Some(vec!["e1".to_string(), "e2".to_string()])
    );
}

#[tokio::test]
async fn test_submit_community_report_sends_empty_enclaves() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .and(body_partial_json(json!({
            "distributionType": "COMMUNITY",
            "enclaveIds": [],
            "timeBegan": 42
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("community-id"))
        .expect(1)
        .mount(&server)
        .await;

    let report = client
        .submit_report(Report::new("t", "b").community().with_time_began(42))
        .await
        .unwrap();
    assert_eq!(report.id.as_deref(), Some("community-id"));
}

#[tokio::test]
async fn test_submit_enclave_report_without_enclaves_fails() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = TruStar::new(test_config(&server)).unwrap();
    let err = client
        .submit_report(Report::new("t", "b"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_update_report_by_external_id() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/reports/tracking-7"))
        .and(query_param("idType", "EXTERNAL"))
        .and(body_json(json!({
            "title": "Changed title",
            "reportBody": "b",
            "externalTrackingId": "tracking-7",
            "distributionType": "ENCLAVE"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let report = Report::new("Changed title", "b").with_external_id("tracking-7");
    let updated = client.update_report(report.clone()).await.unwrap();
    assert_eq!(updated, report);
}

#[tokio::test]
async fn test_update_report_without_ids_fails() {
    let (_server, client) = setup().await;
    let err = client
        .update_report(Report::new("t", "b"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_delete_report() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/reports/4d1fcaee"))
        .and(query_param_is_missing("idType"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_report("4d1fcaee", None).await.unwrap();
}

#[tokio::test]
async fn test_copy_report_from_provided_submission() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/copy/src-1"))
        .and(query_param("destEnclaveId", "dest"))
        .and(query_param("copyFromProvidedSubmission", "true"))
        .and(body_partial_json(json!({
            "title": "[redacted]",
            "tags": ["phishing"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "copy-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let submission = ProvidedSubmission::new(
        Report::new("[redacted]", "body"),
        vec!["phishing".to_string()],
    );
    let copy_id = client
        .copy_report("src-1", "dest", Some(&submission))
        .await
        .unwrap();
    assert_eq!(copy_id, "copy-1");
}

#[tokio::test]
async fn test_copy_report_plain_and_without_tags() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/copy/src-1"))
        .and(query_param("copyFromProvidedSubmission", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "copy-2"})))
        .mount(&server)
        .await;

    assert_eq!(
        client.copy_report("src-1", "dest", None).await.unwrap(),
        "copy-2"
    );

    let untagged = ProvidedSubmission::new(Report::new("t", "b"), vec![]);
    let err = client
        .copy_report("src-1", "dest", Some(&untagged))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_move_report() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/move/r-9"))
        .and(query_param("destEnclaveId", "dest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r-9"})))
        .mount(&server)
        .await;

    assert_eq!(client.move_report("r-9", "dest").await.unwrap(), "r-9");
}

#[tokio::test]
async fn test_move_report_missing_id_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/move/r-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.move_report("r-9", "dest").await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_redact_report() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/redaction/report"))
        .and(body_json(json!({"title": "Call Bob", "reportBody": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Call [redacted]",
            "reportBody": null
        })))
        .mount(&server)
        .await;

    let redacted = client.redact_report(Some("Call Bob"), None).await.unwrap();
    assert_eq!(redacted.title.as_deref(), Some("Call [redacted]"));
    assert_eq!(redacted.body, None);
}

#[tokio::test]
async fn test_get_report_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports/3f8824de/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "3f8824de",
            "status": "SUBMISSION_SUCCESS",
            "errorMessage": ""
        })))
        .mount(&server)
        .await;

    let status = client.get_report_status("3f8824de").await.unwrap();
    assert_eq!(status.status, SubmissionStatus::SubmissionSuccess);
}

// ============================================================================
// Report Listing
// ============================================================================

#[tokio::test]
async fn test_get_reports_page_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .and(query_param("from", "1000"))
        .and(query_param("to", "5000"))
        .and(query_param("distributionType", "COMMUNITY"))
        .and(query_param("enclaveIds", "e1,e2"))
        .and(query_param("tags", "malicious,apt"))
        .and(query_param_is_missing("excludedTags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [report_json("r1", 4000)],
            "hasNext": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ReportFilter::new()
        .enclave(false)
        .with_tags(vec!["malicious".to_string(), "apt".to_string()])
        .between(Some(1000), Some(5000));
    let page = client.get_reports_page(&filter).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.has_next, Some(false));
}

#[tokio::test]
async fn test_get_reports_page_omits_unset_distribution() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .and(query_param_is_missing("distributionType"))
        .and(query_param("enclaveIds", "mine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let filter = ReportFilter::new().with_enclave_ids(vec!["mine".to_string()]);
    let page = client.get_reports_page(&filter).await.unwrap();
    assert!(page.items.is_empty());
}

/// Serves reports newest first from a fixed set, two per response
struct WindowedReports {
    updated: Vec<(&'static str, i64)>,
}

impl Respond for WindowedReports {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<i64>().ok())
        };
        let from = param("from").unwrap_or(i64::MIN);
        let to = param("to").unwrap_or(i64::MAX);

        let items: Vec<Value> = self
            .updated
            .iter()
            .filter(|(_, ts)| *ts >= from && *ts < to)
            .take(2)
            .map(|(id, ts)| report_json(id, *ts))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "items": items }))
    }
}

#[tokio::test]
async fn test_get_reports_walks_time_window() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(WindowedReports {
            updated: vec![
                ("newest", 3 * DAY_MILLIS - 10),
                ("middle", 3 * DAY_MILLIS - 20),
                ("oldest", DAY_MILLIS + 5),
            ],
        })
        .expect(4)
        .mount(&server)
        .await;

    let reports: Vec<Report> = client
        .get_reports(ReportFilter::new().between(Some(0), Some(3 * DAY_MILLIS + 1)))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids(&reports), vec!["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn test_get_reports_stops_on_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let result: crate::error::Result<Vec<Report>> = client
        .get_reports(ReportFilter::new().between(Some(0), Some(DAY_MILLIS)))
        .try_collect()
        .await;
    assert_eq!(result.unwrap_err().status(), Some(403));
}

// ============================================================================
// Correlation and Search
// ============================================================================

#[tokio::test]
async fn test_get_correlated_report_ids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reports/correlate"))
        .and(query_param("indicators", "wannacry,www.evil.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["e3bc6921", "4d04804f"])))
        .mount(&server)
        .await;

    let report_ids = client
        .get_correlated_report_ids(&["wannacry".to_string(), "www.evil.com".to_string()])
        .await
        .unwrap();
    assert_eq!(report_ids, vec!["e3bc6921".to_string(), "4d04804f".to_string()]);
}

#[tokio::test]
async fn test_get_correlated_reports_pages_by_number() {
    let (server, client) = setup().await;

    for (page_number, id) in [("0", "first"), ("1", "second")] {
        Mock::given(method("GET"))
            .and(path("/reports/correlated"))
            .and(query_param("pageNumber", page_number))
            .and(query_param("indicators", "evil.com"))
            .and(query_param("distributionType", "ENCLAVE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [report_json(id, 1)],
                "pageNumber": page_number.parse::<u32>().unwrap(),
                "pageSize": 1,
                "totalElements": 2
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let reports: Vec<Report> = client
        .get_correlated_reports(CorrelationQuery::new(vec!["evil.com".to_string()]))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids(&reports), vec!["first", "second"]);
}

#[tokio::test]
async fn test_search_reports_follows_has_next() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/search"))
        .and(query_param("pageNumber", "0"))
        .and(body_json(json!({"searchTerm": "wannacry"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [report_json("a", 1), report_json("b", 2)],
            "pageNumber": 0,
            "hasNext": true
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reports/search"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [report_json("c", 3)],
            "pageNumber": 1,
            "hasNext": false
        })))
        .mount(&server)
        .await;

    let reports: Vec<Report> = client
        .search_reports(SearchQuery::new("wannacry"))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids(&reports), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_search_reports_rejects_short_term() {
    let (_server, client) = setup().await;
    let err = client
        .search_reports_page(&SearchQuery::new("ab"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_search_reports_empty_term_matches_all() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reports/search"))
        .and(body_json(json!({"searchTerm": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .search_reports_page(&SearchQuery::new(""), Some(0), Some(25))
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

// ============================================================================
// Indicator Summaries
// ============================================================================

#[tokio::test]
async fn test_get_indicator_summaries_follows_cursor() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/indicators/summaries"))
        .and(query_param_is_missing("cursor"))
        .and(query_param("enclaveIds", "e1,e2"))
        .and(body_json(json!(["evil.com"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"value": "evil.com", "type": "URL", "source": {"key": "vt"}}],
            "responseMetadata": {"nextCursor": "c1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/indicators/summaries"))
        .and(query_param("cursor", "c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"value": "evil.com", "type": "URL", "source": {"key": "osint"}}],
            "responseMetadata": {"nextCursor": ""}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summaries: Vec<_> = client
        .get_indicator_summaries(vec!["evil.com".to_string()], None)
        .try_collect()
        .await
        .unwrap();

    let sources: Vec<_> = summaries
        .iter()
        .filter_map(|s| s.source.as_ref().and_then(|src| src.key.as_deref()))
        .collect();
    assert_eq!(sources, vec!["vt", "osint"]);
}

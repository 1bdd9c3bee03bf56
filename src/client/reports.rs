//! Report endpoints

use super::types::{CorrelationQuery, ProvidedSubmission, ReportFilter, SearchQuery};
use super::TruStar;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::models::{Model, RedactedReport, Report, ReportStatus};
use crate::pagination::{flatten_pages, step_back_policy, NumberedPage, TimeWindowPager};
use crate::types::{
    now_millis, DistributionType, IdType, JsonValue, Method, OptionStringExt, DAY_MILLIS,
};
use futures::Stream;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Submissions can take a while to process server side
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

const MIN_SEARCH_TERM_LEN: usize = 3;

impl TruStar {
    // ========================================================================
    // Single Reports
    // ========================================================================

    /// Fetch one report by internal or external id
    pub async fn get_report_details(&self, report_id: &str, id_type: Option<IdType>) -> Result<Report> {
        let request = RequestConfig::new().query_opt("idType", id_type.map(IdType::as_str));
        let raw: JsonValue = self
            .http
            .get_json(&format!("reports/{report_id}"), request)
            .await?;
        Report::from_value(raw)
    }

    /// Submit a new report and return it with its assigned id
    ///
    /// Enclave reports without enclaves get the configured ones; community
    /// reports get an empty list. An unset `time_began` becomes now.
    pub async fn submit_report(&self, mut report: Report) -> Result<Report> {
        if report.enclave_ids.is_none() {
            report.enclave_ids = Some(if report.is_enclave() {
                self.config.enclave_ids.clone()
            } else {
                Vec::new()
            });
        }

        if report.is_enclave() && report.enclave_ids.as_ref().is_some_and(Vec::is_empty) {
            return Err(Error::invalid_request(
                "Cannot submit a report of distribution type 'ENCLAVE' with an empty set of enclaves",
            ));
        }

        if report.time_began.is_none() {
            report.time_began = Some(now_millis());
        }

        let request = RequestConfig::new()
            .json(report.to_value(true)?)
            .timeout(SUBMIT_TIMEOUT);
        let body = self.http.request_text(Method::POST, "reports", request).await?;

        let report_id = body.trim().trim_matches('"');
        if report_id.is_empty() {
            return Err(Error::decode("Report submission returned no id"));
        }
        info!(report_id, title = ?report.title, "Submitted report");
        report.id = Some(report_id.to_string());
        Ok(report)
    }

    /// Overwrite the stored report with every non-null field of `report`
    ///
    /// The internal id is used when present, else the external id.
    pub async fn update_report(&self, report: Report) -> Result<Report> {
        let (report_id, id_type) = match (&report.id, &report.external_id) {
            (Some(id), _) => (id.clone(), IdType::Internal),
            (None, Some(external_id)) => (external_id.clone(), IdType::External),
            (None, None) => {
                return Err(Error::invalid_request(
                    "Cannot update report without either an ID or an external ID",
                ))
            }
        };

        // The id itself cannot be changed
        let mut body = report.to_value(true)?;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
        }

        let request = RequestConfig::new()
            .query("idType", id_type.as_str())
            .json(body);
        self.http
            .request(Method::PUT, &format!("reports/{report_id}"), request)
            .await?;
        debug!(report_id = %report_id, "Updated report");
        Ok(report)
    }

    pub async fn delete_report(&self, report_id: &str, id_type: Option<IdType>) -> Result<()> {
        let request = RequestConfig::new().query_opt("idType", id_type.map(IdType::as_str));
        self.http
            .request(Method::DELETE, &format!("reports/{report_id}"), request)
            .await?;
        info!(report_id, "Deleted report");
        Ok(())
    }

    /// Copy a report into another enclave and return the copy's id
    ///
    /// With `provided_submission`, the copy is built from that report and tag
    /// list instead of the source's content; the copy still references the
    /// source.
    pub async fn copy_report(
        &self,
        src_report_id: &str,
        dest_enclave_id: &str,
        provided_submission: Option<&ProvidedSubmission>,
    ) -> Result<String> {
        let mut request = RequestConfig::new()
            .query("destEnclaveId", dest_enclave_id)
            .query(
                "copyFromProvidedSubmission",
                provided_submission.is_some().to_string(),
            );

        if let Some(submission) = provided_submission {
            if submission.tags.is_empty() {
                return Err(Error::invalid_request(
                    "Cannot copy from provided submission without a list of tags",
                ));
            }
            let mut body = submission.report.to_value(true)?;
            if let Some(fields) = body.as_object_mut() {
                fields.insert("tags".to_string(), json!(submission.tags));
            }
            request = request.json(body);
        }

        let response: JsonValue = self
            .http
            .request_json(Method::POST, &format!("reports/copy/{src_report_id}"), request)
            .await?;
        response_id(&response, "copy")
    }

    /// Move a report (and its tags) into another enclave
    pub async fn move_report(&self, report_id: &str, dest_enclave_id: &str) -> Result<String> {
        let request = RequestConfig::new().query("destEnclaveId", dest_enclave_id);
        let response: JsonValue = self
            .http
            .request_json(Method::POST, &format!("reports/move/{report_id}"), request)
            .await?;
        response_id(&response, "move")
    }

    /// Run the title and body through the redaction service
    pub async fn redact_report(
        &self,
        title: Option<&str>,
        report_body: Option<&str>,
    ) -> Result<RedactedReport> {
        let request = RequestConfig::new().json(json!({
            "title": title,
            "reportBody": report_body,
        }));
        let raw: JsonValue = self
            .http
            .request_json(Method::POST, "redaction/report", request)
            .await?;
        RedactedReport::from_value(raw)
    }

    /// Link to the report in the Station web UI
    pub fn get_report_deeplink(&self, report_id: &str) -> String {
        format!(
            "{}/constellation/reports/{report_id}",
            self.config.station.trim_end_matches('/')
        )
    }

    pub async fn get_report_status(&self, report_id: &str) -> Result<ReportStatus> {
        let raw: JsonValue = self
            .http
            .get_json(&format!("reports/{report_id}/status"), RequestConfig::new())
            .await?;
        ReportStatus::from_value(raw)
    }

    // ========================================================================
    // Report Listing (time window)
    // ========================================================================

    /// One page of reports inside the filter's time window, newest first
    ///
    /// The server caps the window; the page does not carry page numbers.
    pub async fn get_reports_page(&self, filter: &ReportFilter) -> Result<NumberedPage<Report>> {
        let request = RequestConfig::new()
            .query_opt("from", filter.from_time)
            .query_opt("to", filter.to_time)
            .query_opt(
                "distributionType",
                filter
                    .is_enclave
                    .map(|is_enclave| DistributionType::from_is_enclave(is_enclave).as_str()),
            )
            .query_list(
                "enclaveIds",
                self.enclave_ids_or_default(filter.enclave_ids.as_deref()),
            )
            .query_list("tags", filter.tags.as_deref())
            .query_list("excludedTags", filter.excluded_tags.as_deref());

        let raw: JsonValue = self.http.get_json("reports", request).await?;
        NumberedPage::from_value(raw)
    }

    /// Every report matching the filter, walking the time window backwards
    ///
    /// Each next request ends just before the oldest report seen; empty
    /// windows step back one day until the window passes `from_time`.
    pub fn get_reports(&self, filter: ReportFilter) -> impl Stream<Item = Result<Report>> + '_ {
        let (from_time, to_time) = (filter.from_time, filter.to_time);
        let pages = TimeWindowPager::new(
            move |from_time, to_time| {
                let window = ReportFilter {
                    from_time,
                    to_time: Some(to_time),
                    ..filter.clone()
                };
                async move { self.get_reports_page(&window).await }
            },
            step_back_policy::<Report>(DAY_MILLIS),
            from_time,
            to_time,
        )
        .into_stream();
        flatten_pages(pages)
    }

    // ========================================================================
    // Correlation
    // ========================================================================

    /// Ids of reports containing any of the indicator values
    pub async fn get_correlated_report_ids(&self, indicators: &[String]) -> Result<Vec<String>> {
        let request = RequestConfig::new().query_list("indicators", Some(indicators));
        self.http.get_json("reports/correlate", request).await
    }

    /// One page of reports containing any of the query's indicators
    pub async fn get_correlated_reports_page(
        &self,
        query: &CorrelationQuery,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<NumberedPage<Report>> {
        let request = RequestConfig::new()
            .query_list("indicators", Some(query.indicators.as_slice()))
            .query_list("enclaveIds", query.enclave_ids.as_deref())
            .query(
                "distributionType",
                DistributionType::from_is_enclave(query.is_enclave).as_str(),
            )
            .query_opt("pageNumber", page_number)
            .query_opt("pageSize", page_size);

        let raw: JsonValue = self.http.get_json("reports/correlated", request).await?;
        NumberedPage::from_value(raw)
    }

    /// Every report containing any of the query's indicators
    pub fn get_correlated_reports(
        &self,
        query: CorrelationQuery,
    ) -> impl Stream<Item = Result<Report>> + '_ {
        let pages = NumberedPage::page_stream(
            move |page_number, page_size| {
                let query = query.clone();
                async move {
                    self.get_correlated_reports_page(&query, Some(page_number), page_size)
                        .await
                }
            },
            0,
            None,
        );
        flatten_pages(pages)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// One page of reports matching a search term
    ///
    /// Report bodies are not included in search results.
    pub async fn search_reports_page(
        &self,
        query: &SearchQuery,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<NumberedPage<Report>> {
        let search_term = query.search_term.clone().none_if_empty();
        if let Some(ref term) = search_term {
            if term.chars().count() < MIN_SEARCH_TERM_LEN {
                return Err(Error::invalid_request(format!(
                    "Search term '{term}' must be at least {MIN_SEARCH_TERM_LEN} characters"
                )));
            }
        }

        let request = RequestConfig::new()
            .query_list("enclaveIds", query.enclave_ids.as_deref())
            .query_opt("from", query.from_time)
            .query_opt("to", query.to_time)
            .query_list("tags", query.tags.as_deref())
            .query_list("excludedTags", query.excluded_tags.as_deref())
            .query_opt("pageNumber", page_number)
            .query_opt("pageSize", page_size)
            .json(json!({ "searchTerm": search_term }));

        let raw: JsonValue = self
            .http
            .request_json(Method::POST, "reports/search", request)
            .await?;
        NumberedPage::from_value(raw)
    }

    /// Every report matching a search term
    pub fn search_reports(&self, query: SearchQuery) -> impl Stream<Item = Result<Report>> + '_ {
        let pages = NumberedPage::page_stream(
            move |page_number, page_size| {
                let query = query.clone();
                async move {
                    self.search_reports_page(&query, Some(page_number), page_size)
                        .await
                }
            },
            0,
            None,
        );
        flatten_pages(pages)
    }
}

fn response_id(response: &JsonValue, operation: &str) -> Result<String> {
    response
        .get("id")
        .and_then(JsonValue::as_str)
        .map(String::from)
        .ok_or_else(|| Error::decode(format!("Report {operation} response has no id")))
}

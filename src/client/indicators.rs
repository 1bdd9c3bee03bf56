//! Indicator summary endpoints

use super::TruStar;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::models::IndicatorSummary;
use crate::pagination::{flatten_pages, CursorPage};
use crate::types::{JsonValue, Method};
use futures::Stream;
use serde_json::json;

impl TruStar {
    /// One page of source summaries for the given indicator values
    ///
    /// `cursor` comes from the previous page; `None` asks for the first page.
    pub async fn get_indicator_summaries_page(
        &self,
        values: &[String],
        enclave_ids: Option<&[String]>,
        cursor: Option<&str>,
    ) -> Result<CursorPage<IndicatorSummary>> {
        let request = RequestConfig::new()
            .query_list("enclaveIds", self.enclave_ids_or_default(enclave_ids))
            .query_opt("cursor", cursor)
            .json(json!(values));

        let raw: JsonValue = self
            .http
            .request_json(Method::POST, "indicators/summaries", request)
            .await?;
        CursorPage::from_value(raw)
    }

    /// Every source summary for the given indicator values
    pub fn get_indicator_summaries(
        &self,
        values: Vec<String>,
        enclave_ids: Option<Vec<String>>,
    ) -> impl Stream<Item = Result<IndicatorSummary>> + '_ {
        let pages = CursorPage::page_stream(
            move |cursor: Option<String>| {
                let (values, enclave_ids) = (values.clone(), enclave_ids.clone());
                async move {
                    self.get_indicator_summaries_page(
                        &values,
                        enclave_ids.as_deref(),
                        cursor.as_deref(),
                    )
                    .await
                }
            },
            None,
        );
        flatten_pages(pages)
    }
}

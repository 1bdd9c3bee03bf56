//! CLI runner - executes commands

use crate::cli::commands::{non_empty, Cli, Commands, OutputFormat};
use crate::client::{CorrelationQuery, ReportFilter, SearchQuery, TruStar};
use crate::config::TruStarConfig;
use crate::error::Result;
use futures::{Stream, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::json;
use std::pin::pin;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let client = self.client()?;

        match &self.cli.command {
            Commands::Reports {
                window,
                community,
                enclave_ids,
                tags,
                excluded_tags,
                limit,
            } => {
                let filter = ReportFilter {
                    is_enclave: Some(!community),
                    enclave_ids: non_empty(enclave_ids),
                    tags: non_empty(tags),
                    excluded_tags: non_empty(excluded_tags),
                    from_time: window.from,
                    to_time: window.to,
                };
                let count = self.print_stream(client.get_reports(filter), *limit).await?;
                info!(count, "Listed reports");
            }
            Commands::Search {
                term,
                window,
                enclave_ids,
                limit,
            } => {
                let mut query = SearchQuery::new(term.as_str()).between(window.from, window.to);
                query.enclave_ids = non_empty(enclave_ids);
                let count = self.print_stream(client.search_reports(query), *limit).await?;
                info!(count, "Searched reports");
            }
            Commands::Correlated {
                indicators,
                community,
                ids_only,
                limit,
            } => {
                if *ids_only {
                    let ids = client.get_correlated_report_ids(indicators).await?;
                    let count = self
                        .print_stream(futures::stream::iter(ids.into_iter().map(Ok)), *limit)
                        .await?;
                    info!(count, "Listed correlated report ids");
                } else {
                    let mut query = CorrelationQuery::new(indicators.clone());
                    if *community {
                        query = query.community();
                    }
                    let count = self
                        .print_stream(client.get_correlated_reports(query), *limit)
                        .await?;
                    info!(count, "Listed correlated reports");
                }
            }
            Commands::Get { report_id, id } => {
                let report = client
                    .get_report_details(report_id, Some(id.id_type()))
                    .await?;
                self.output(&report);
            }
            Commands::Status { report_id } => {
                self.output(&client.get_report_status(report_id).await?);
            }
            Commands::Redact { title, body } => {
                let redacted = client
                    .redact_report(title.as_deref(), body.as_deref())
                    .await?;
                self.output(&redacted);
            }
            Commands::Deeplink { report_id } => {
                self.output(&json!({ "url": client.get_report_deeplink(report_id) }));
            }
            Commands::Delete { report_id, id } => {
                client.delete_report(report_id, Some(id.id_type())).await?;
                self.output(&json!({ "deleted": report_id }));
            }
            Commands::Summaries {
                values,
                enclave_ids,
                limit,
            } => {
                let summaries = client.get_indicator_summaries(values.clone(), non_empty(enclave_ids));
                let count = self.print_stream(summaries, *limit).await?;
                info!(count, "Listed indicator summaries");
            }
        }
        Ok(())
    }

    /// Client from the config file, or from the environment alone when the
    /// file does not exist
    fn client(&self) -> Result<TruStar> {
        let config = if self.cli.config.exists() {
            TruStarConfig::load(&self.cli.config, &self.cli.role)?
        } else {
            debug!(path = %self.cli.config.display(), "Config file not found, using environment");
            let mut config = TruStarConfig::default();
            config.apply_env_overrides();
            config
        };
        TruStar::new(config)
    }

    /// Print items until the stream ends or `limit` is reached
    async fn print_stream<T, S>(&self, items: S, limit: Option<usize>) -> Result<usize>
    where
        T: Serialize,
        S: Stream<Item = Result<T>>,
    {
        let mut items = pin!(items.take(limit.unwrap_or(usize::MAX)));
        let mut count = 0;
        while let Some(item) = items.try_next().await? {
            self.output(&item);
            count += 1;
        }
        Ok(count)
    }

    fn output<T: Serialize>(&self, item: &T) {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(item),
            OutputFormat::Pretty => serde_json::to_string_pretty(item),
        };
        println!("{}", line.unwrap_or_default());
    }
}

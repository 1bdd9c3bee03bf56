//! CLI commands and argument parsing

use crate::config::DEFAULT_ROLE;
use crate::types::{parse_timestamp, IdType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// TruSTAR API command-line client
#[derive(Parser, Debug)]
#[command(name = "trustar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, one section per role)
    #[arg(short = 'C', long, global = true, default_value = "trustar.yaml")]
    pub config: PathBuf,

    /// Section of the configuration file to use
    #[arg(short, long, global = true, default_value = DEFAULT_ROLE)]
    pub role: String,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List reports in a time window, newest first
    Reports {
        #[command(flatten)]
        window: TimeArgs,

        /// Only community reports (default: enclave reports)
        #[arg(long)]
        community: bool,

        /// Enclave ids (comma-separated, default: configured enclaves)
        #[arg(long, value_delimiter = ',')]
        enclave_ids: Vec<String>,

        /// Required tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Excluded tags (comma-separated)
        #[arg(long, value_delimiter = ',')]
        excluded_tags: Vec<String>,

        /// Maximum reports to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Full-text search over reports
    Search {
        /// Search term (at least 3 characters)
        term: String,

        #[command(flatten)]
        window: TimeArgs,

        /// Enclave ids (comma-separated)
        #[arg(long, value_delimiter = ',')]
        enclave_ids: Vec<String>,

        /// Maximum reports to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Reports containing any of the given indicators
    Correlated {
        /// Indicator values
        #[arg(required = true)]
        indicators: Vec<String>,

        /// Search community reports instead of enclave reports
        #[arg(long)]
        community: bool,

        /// Only print report ids
        #[arg(long)]
        ids_only: bool,

        /// Maximum reports to print
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one report
    Get {
        report_id: String,

        #[command(flatten)]
        id: IdArgs,
    },

    /// Show the processing status of a submitted report
    Status { report_id: String },

    /// Redact a title and body with the redaction service
    Redact {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },

    /// Print the Station link of a report
    Deeplink { report_id: String },

    /// Delete a report
    Delete {
        report_id: String,

        #[command(flatten)]
        id: IdArgs,
    },

    /// Intelligence source summaries for indicator values
    Summaries {
        /// Indicator values
        #[arg(required = true)]
        values: Vec<String>,

        /// Enclave ids (comma-separated, default: configured enclaves)
        #[arg(long, value_delimiter = ',')]
        enclave_ids: Vec<String>,

        /// Maximum summaries to print
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Time window bounds (epoch millis or ISO-8601)
#[derive(Args, Debug, Clone, Default)]
pub struct TimeArgs {
    #[arg(long, value_parser = parse_time)]
    pub from: Option<i64>,

    #[arg(long, value_parser = parse_time)]
    pub to: Option<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct IdArgs {
    /// Treat the id as an external tracking id
    #[arg(long)]
    pub external: bool,
}

impl IdArgs {
    pub fn id_type(&self) -> IdType {
        if self.external {
            IdType::External
        } else {
            IdType::Internal
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one object per line)
    Json,
    /// Human-readable output
    Pretty,
}

fn parse_time(raw: &str) -> std::result::Result<i64, String> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| parse_timestamp(raw))
        .ok_or_else(|| format!("'{raw}' is not epoch millis or an ISO-8601 time"))
}

/// Empty flag lists mean "not given"
pub(crate) fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

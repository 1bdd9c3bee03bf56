//! CLI module
//!
//! Command-line access to the report and indicator endpoints.
//!
//! # Commands
//!
//! - `reports` - List reports in a time window
//! - `search` - Full-text report search
//! - `correlated` - Reports containing given indicators
//! - `get`, `status`, `deeplink`, `delete` - Single report operations
//! - `redact` - Run text through the redaction service
//! - `summaries` - Indicator summaries from intelligence sources

mod commands;
mod runner;

pub use commands::{Cli, Commands, IdArgs, OutputFormat, TimeArgs};
pub use runner::Runner;

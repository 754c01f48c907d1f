//! Command implementations for analyzing 389 Directory Server access logs.
//!
//! Every log-reading command takes the same [`InputOptions`], folds all
//! input files into one [`ConnectionRegistry`], applies the optional
//! source-IP filter, and renders a report to stdout.
//!
//! ## Session Reports
//!
//! - [`src_ip_table`] - Completed sessions: source IP with bind and unbind times
//! - [`open_connections`] - Sessions with no disconnect yet
//! - [`unique_clients`] - Distinct client addresses
//! - [`unindexed_searches`] - Searches that ran with a partially unindexed filter
//!
//! ## Raw Data
//!
//! - [`parse`] - Parsed events as JSON lines, for inspecting the parser
//! - [`export`] - Whole session model as JSON or CSV
//!
//! Report writers take any [`std::io::Write`] and an address display
//! function, so they are tested without touching stdout or DNS.

pub mod export;
pub mod open_connections;
pub mod parse;
pub mod src_ip_table;
pub mod unique_clients;
pub mod unindexed_searches;

use crate::session::ConnectionRegistry;
use crate::utils::format::NOT_AVAILABLE;
use crate::utils::hostname::HostnameCache;
use crate::utils::processor::{LineFailure, LogProcessor};
use anyhow::Result;
use clap::Args;
use std::collections::HashSet;
use tracing::debug;

/// Input options shared by every log-reading command
#[derive(Debug, Clone, Default, Args)]
pub struct InputOptions {
    /// Path to access log file(s), processed in order - `-` reads stdin, .gz/.zst are decompressed
    #[arg(required = true)]
    pub log_files: Vec<String>,

    /// Report every dropped line with the reason it could not be parsed
    #[arg(long)]
    pub debug: bool,

    /// Only report connections from these source IPs (comma-separated)
    #[arg(long = "filter-client-ip", value_delimiter = ',', value_name = "IP")]
    pub filter_client_ips: Vec<String>,

    /// Show reverse-DNS host names instead of client IP addresses
    #[arg(long)]
    pub resolve_hostnames: bool,
}

impl InputOptions {
    pub fn new(log_files: Vec<String>) -> Self {
        Self {
            log_files,
            ..Self::default()
        }
    }
}

/// Read every input file into one registry and apply the source-IP filter.
pub fn load_registry(input: &InputOptions) -> Result<ConnectionRegistry> {
    let (registry, stats) = LogProcessor::new(&input.log_files, "Reading access log")
        .build_registry(report_dropped_line)?;
    stats.report();

    if input.filter_client_ips.is_empty() {
        return Ok(registry);
    }
    let wanted: HashSet<String> = input.filter_client_ips.iter().cloned().collect();
    let before = registry.len();
    let registry = registry.filter_by_source_ips(&wanted);
    debug!(
        kept = registry.len(),
        dropped = before - registry.len(),
        "applied source IP filter"
    );
    Ok(registry)
}

fn report_dropped_line(failure: &LineFailure<'_>) {
    debug!(
        file = failure.file,
        line = failure.line_number,
        error = %failure.error,
        "dropped line: {}",
        failure.text
    );
}

/// Address rendering for reports: identity, or memoized reverse DNS.
pub fn address_display(resolve_hostnames: bool) -> Box<dyn FnMut(&str) -> String> {
    if resolve_hostnames {
        let mut cache = HostnameCache::system();
        Box::new(move |ip: &str| cache.lookup(ip))
    } else {
        Box::new(|ip: &str| ip.to_string())
    }
}

/// Table cell for a possibly unknown client address
pub(crate) fn address_cell(ip: Option<&str>, display: &mut impl FnMut(&str) -> String) -> String {
    ip.map_or_else(|| NOT_AVAILABLE.to_string(), display)
}

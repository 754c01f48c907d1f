//! Searches that ran against a partially unindexed filter.
//!
//! The server flags such searches with `details="Partially Unindexed Filter"`
//! on the RESULT line. They are a common cause of slow responses and usually
//! point to a missing index on one of the filter attributes.
//!
//! # Usage
//!
//! ```bash
//! ds-access unindexed-searches /var/log/dirsrv/slapd-example/access
//! ```
//!
//! # Output
//!
//! One row per search, oldest first: Timestamp, Conn, Op, Base, Filter.

use super::{load_registry, InputOptions};
use crate::session::ConnectionRegistry;
use crate::utils::format::{format_iso, format_number, or_na};
use anyhow::Result;
use std::io::Write;

pub fn write_report<W: Write>(registry: &ConnectionRegistry, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "{:<35} {:<10} {:<10} {:<30} Filter",
        "Timestamp", "Conn", "Op", "Base"
    )?;
    writeln!(
        out,
        "{} {} {} {} {}",
        "-".repeat(35),
        "-".repeat(10),
        "-".repeat(10),
        "-".repeat(30),
        "-".repeat(40)
    )?;

    let searches = registry.unindexed_searches();
    for search in &searches {
        let attrs = &search.operation.attributes;
        writeln!(
            out,
            "{:<35} {:<10} {:<10} {:<30} {}",
            format_iso(&search.operation.timestamp),
            search.connection.id,
            search.operation.operation_id,
            or_na(attrs.base.as_deref()),
            or_na(attrs.filter.as_deref())
        )?;
    }

    writeln!(out, "\nUnindexed searches: {}", format_number(searches.len()))?;
    Ok(())
}

pub fn run(input: &InputOptions) -> Result<()> {
    let registry = load_registry(input)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&registry, &mut out)
}

//! Completed session table.
//!
//! Lists connections that bound successfully and were later closed, with the
//! client address and both ends of the session.
//!
//! # Usage
//!
//! ```bash
//! ds-access src-ip-table /var/log/dirsrv/slapd-example/access
//!
//! # Rotated logs, oldest first, one client only
//! ds-access src-ip-table access.20250609-*.gz access --filter-client-ip 10.0.0.5
//! ```
//!
//! # Output
//!
//! One row per session, ordered by bind time:
//! - Source IP (or host name with `--resolve-hostnames`)
//! - Bind Timestamp (time of the BIND request that succeeded)
//! - Unbind Timestamp (time the connection was closed)

use super::{address_cell, address_display, load_registry, InputOptions};
use crate::session::ConnectionRegistry;
use crate::utils::format::format_optional_iso;
use anyhow::Result;
use std::io::Write;

/// Render the table for `registry`.
pub fn write_report<W: Write>(
    registry: &ConnectionRegistry,
    mut display: impl FnMut(&str) -> String,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "{:<20} {:<35} {:<35}",
        "Source IP", "Bind Timestamp", "Unbind Timestamp"
    )?;
    writeln!(out, "{} {} {}", "-".repeat(20), "-".repeat(35), "-".repeat(35))?;

    for conn in registry.completed_binds() {
        writeln!(
            out,
            "{:<20} {:<35} {:<35}",
            address_cell(conn.source_ip.as_deref(), &mut display),
            format_optional_iso(conn.bind_timestamp.as_ref()),
            format_optional_iso(conn.unbind_timestamp.as_ref())
        )?;
    }
    Ok(())
}

pub fn run(input: &InputOptions) -> Result<()> {
    let registry = load_registry(input)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&registry, address_display(input.resolve_hostnames), &mut out)
}

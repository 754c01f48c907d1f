//! Connections still open at the end of the log.
//!
//! A connection is open until a disconnect (`closed`) line is seen for it,
//! whether or not it ever bound. Long-lived pooled connections and sessions
//! abandoned by crashed clients both show up here.
//!
//! # Usage
//!
//! ```bash
//! ds-access open-connections /var/log/dirsrv/slapd-example/access
//! zcat access.*.gz | ds-access open-connections -
//! ```
//!
//! # Output
//!
//! - Source IP
//! - Bind DN (`N/A` until a bind succeeds)
//! - Bind Timestamp
//!
//! Bound connections are listed first by bind time, then unbound ones by
//! connection id.

use super::{address_cell, address_display, load_registry, InputOptions};
use crate::session::ConnectionRegistry;
use crate::utils::format::{format_number, format_optional_iso, or_na};
use anyhow::Result;
use std::io::Write;

pub fn write_report<W: Write>(
    registry: &ConnectionRegistry,
    mut display: impl FnMut(&str) -> String,
    out: &mut W,
) -> Result<()> {
    writeln!(
        out,
        "{:<20} {:<50} {:<35}",
        "Source IP", "Bind DN", "Bind Timestamp"
    )?;
    writeln!(out, "{} {} {}", "-".repeat(20), "-".repeat(50), "-".repeat(35))?;

    let open = registry.open_connections();
    for conn in &open {
        writeln!(
            out,
            "{:<20} {:<50} {:<35}",
            address_cell(conn.source_ip.as_deref(), &mut display),
            or_na(conn.bind_dn.as_deref()),
            format_optional_iso(conn.bind_timestamp.as_ref())
        )?;
    }

    writeln!(out, "\nOpen connections: {}", format_number(open.len()))?;
    Ok(())
}

pub fn run(input: &InputOptions) -> Result<()> {
    let registry = load_registry(input)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&registry, address_display(input.resolve_hostnames), &mut out)
}

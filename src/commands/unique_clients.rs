//! Distinct client addresses seen in the log.
//!
//! # Usage
//!
//! ```bash
//! ds-access unique-clients access.20250609-000000.gz access
//! ds-access unique-clients access --resolve-hostnames
//! ```

use super::{address_display, load_registry, InputOptions};
use crate::session::ConnectionRegistry;
use anyhow::Result;
use std::io::Write;

pub fn write_report<W: Write>(
    registry: &ConnectionRegistry,
    mut display: impl FnMut(&str) -> String,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Unique Client IPs")?;
    writeln!(out, "-----------------")?;
    for ip in registry.unique_clients() {
        writeln!(out, "{}", display(ip))?;
    }
    Ok(())
}

pub fn run(input: &InputOptions) -> Result<()> {
    let registry = load_registry(input)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&registry, address_display(input.resolve_hostnames), &mut out)
}

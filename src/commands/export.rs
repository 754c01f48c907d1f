//! Export the reconstructed session model.
//!
//! # Usage
//!
//! ```bash
//! # Full model as JSON on stdout
//! ds-access export access
//!
//! # One CSV row per operation
//! ds-access export access.*.gz access --format csv -o sessions.csv
//! ```
//!
//! # Output
//!
//! **JSON**: an array of connections ordered by connection id, each with its
//! operations ordered by operation id and the attributes of their RESULT.
//!
//! **CSV**: one row per operation with the owning connection's fields
//! repeated. Connections without operations get a single row with empty
//! operation columns. Attribute sets are embedded as JSON objects.

use super::{load_registry, InputOptions};
use crate::access::types::Attributes;
use crate::session::{Connection, ConnectionRegistry, Operation};
use crate::utils::format::{format_iso, format_number};
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

#[derive(Serialize)]
struct ExportRow<'a> {
    connection_id: u64,
    source_ip: Option<&'a str>,
    destination_ip: Option<&'a str>,
    bind_dn: Option<&'a str>,
    bind_timestamp: Option<String>,
    unbind_timestamp: Option<String>,
    successful_bind: bool,
    operation_id: Option<i64>,
    kind: Option<&'static str>,
    timestamp: Option<String>,
    result_code: Option<i64>,
    etime: Option<f64>,
    attributes: Option<String>,
    free_text: Option<&'a str>,
    result: Option<String>,
}

impl<'a> ExportRow<'a> {
    fn new(conn: &'a Connection, op: Option<&'a Operation>) -> Result<Self> {
        Ok(Self {
            connection_id: conn.id,
            source_ip: conn.source_ip.as_deref(),
            destination_ip: conn.destination_ip.as_deref(),
            bind_dn: conn.bind_dn.as_deref(),
            bind_timestamp: conn.bind_timestamp.as_ref().map(format_iso),
            unbind_timestamp: conn.unbind_timestamp.as_ref().map(format_iso),
            successful_bind: conn.successful_bind,
            operation_id: op.map(|op| op.operation_id),
            kind: op.map(|op| op.kind.as_str()),
            timestamp: op.map(|op| format_iso(&op.timestamp)),
            result_code: op.and_then(Operation::result_code),
            etime: op.and_then(|op| op.result.as_ref()?.etime),
            attributes: op.map(|op| attributes_json(&op.attributes)).transpose()?,
            free_text: op.map(|op| op.free_text.as_str()).filter(|t| !t.is_empty()),
            result: op
                .and_then(|op| op.result.as_ref())
                .map(attributes_json)
                .transpose()?,
        })
    }
}

fn attributes_json(attributes: &Attributes) -> Result<String> {
    serde_json::to_string(attributes).context("Failed to serialize attributes")
}

/// Write the registry as pretty-printed JSON.
pub fn write_json<W: Write>(registry: &ConnectionRegistry, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, registry).context("Failed to serialize to JSON")
}

/// Write the registry as CSV, one row per operation.
pub fn write_csv<W: Write>(registry: &ConnectionRegistry, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for conn in registry.connections() {
        if conn.operations.is_empty() {
            writer.serialize(ExportRow::new(conn, None)?)?;
            continue;
        }
        for op in conn.operations() {
            writer.serialize(ExportRow::new(conn, Some(op))?)?;
        }
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn run(input: &InputOptions, format: &str, output: Option<&str>) -> Result<()> {
    if format != "json" && format != "csv" {
        bail!("Invalid format '{}'. Use 'json' or 'csv'", format);
    }
    let write = |registry: &ConnectionRegistry, out: &mut dyn Write| -> Result<()> {
        if format == "csv" {
            write_csv(registry, out)
        } else {
            write_json(registry, out)
        }
    };

    let registry = load_registry(input)?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            let mut out = BufWriter::new(file);
            write(&registry, &mut out)?;
            out.flush()
                .with_context(|| format!("Failed to write output file: {}", path))?;
            eprintln!(
                "Exported {} connections to {}",
                format_number(registry.len()),
                path
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write(&registry, &mut stdout)?;
            if format == "json" {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

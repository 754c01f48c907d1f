//! Dump parsed events as JSON lines.
//!
//! Useful for checking how a particular line is tokenized and classified,
//! or for feeding events to `jq`.
//!
//! # Usage
//!
//! ```bash
//! # A single line
//! ds-access parse --line '[10/Jun/2025:21:18:07.200000Z] conn=100 op=-1 fd=12 closed'
//!
//! # Every line of a file
//! ds-access parse access | jq 'select(.kind == "SRCH")'
//! ```
//!
//! # Output
//!
//! One JSON object per non-blank line. Lines that fail to parse produce
//! `{"line_number": .., "text": .., "error": ..}` instead of an event.

use crate::access::parser::{parse_line, AccessLogReader, LineRecord};
use anyhow::{Context, Result};
use serde_json::json;
use std::io::{BufRead, Write};

/// Write one JSON line for `record`.
pub fn write_record<W: Write>(record: &LineRecord, out: &mut W) -> Result<()> {
    match &record.parsed {
        Ok(event) => serde_json::to_writer(&mut *out, event).context("Failed to serialize event")?,
        Err(error) => serde_json::to_writer(
            &mut *out,
            &json!({
                "line_number": record.line_number,
                "text": record.text,
                "error": error.to_string(),
            }),
        )
        .context("Failed to serialize parse failure")?,
    }
    writeln!(out)?;
    Ok(())
}

/// Write every record of `reader`, returning how many failed to parse.
pub fn write_all<R: BufRead, W: Write>(reader: &mut AccessLogReader<R>, out: &mut W) -> Result<usize> {
    let mut failures = 0;
    while let Some(record) = reader.next_record()? {
        if record.parsed.is_err() {
            failures += 1;
        }
        write_record(&record, out)?;
    }
    Ok(failures)
}

pub fn run(log_files: &[String], line: Option<&str>) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(line) = line {
        let record = LineRecord {
            line_number: 1,
            text: line.trim().to_string(),
            parsed: parse_line(line.trim()),
        };
        return write_record(&record, &mut out);
    }

    for log_file in log_files {
        let mut reader = AccessLogReader::open(log_file)?;
        let failures = write_all(&mut reader, &mut out)?;
        if failures > 0 {
            eprintln!("{}: {} line(s) could not be parsed", log_file, failures);
        }
    }
    Ok(())
}

//! Line entry point and streaming reader.
//!
//! [`parse_line`] turns one access log line into a classified [`LogEvent`].
//! [`AccessLogReader`] runs it over a byte stream, decoding invalid UTF-8
//! lossily and skipping blank lines.

use super::classifier::classify;
use super::error::ParseError;
use super::tokenizer::tokenize;
use super::types::LogEvent;
use crate::utils::reader::open_file;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Parse and classify one raw line.
///
/// # Examples
///
/// ```
/// use ds_access_tools::access::parser::parse_line;
/// use ds_access_tools::access::types::OperationKind;
///
/// let event = parse_line("[10/Jun/2025:21:18:07.200000Z] conn=100 op=-1 fd=12 closed").unwrap();
/// assert_eq!(event.kind, OperationKind::Disconnect);
/// assert_eq!(event.connection_id, Some(100));
/// ```
pub fn parse_line(line: &str) -> Result<LogEvent, ParseError> {
    tokenize(line).map(classify)
}

/// A non-blank line read from an access log, with its parse outcome.
#[derive(Debug)]
pub struct LineRecord {
    /// 1-based line number within the source
    pub line_number: usize,
    pub text: String,
    pub parsed: Result<LogEvent, ParseError>,
}

/// Iterator-like reader over access log lines
pub struct AccessLogReader<R> {
    reader: R,
    line_buffer: Vec<u8>,
    line_number: usize,
}

impl AccessLogReader<BufReader<Box<dyn Read + Send>>> {
    /// Open a log file (plain, `.gz` or `.zst`), or stdin for `-`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = open_file(path)
            .with_context(|| format!("Failed to open access log: {}", path.display()))?;
        Ok(Self::new(BufReader::new(source)))
    }
}

impl<R: BufRead> AccessLogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// Read the next non-blank line, parsed or not.
    ///
    /// Invalid UTF-8 is replaced rather than treated as a read error, so a
    /// partially written line only costs that line.
    pub fn next_record(&mut self) -> Result<Option<LineRecord>> {
        loop {
            self.line_buffer.clear();
            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.line_buffer)
                .with_context(|| format!("Failed to read line {}", self.line_number + 1))?;

            if bytes_read == 0 {
                return Ok(None); // EOF
            }
            self.line_number += 1;

            let text = String::from_utf8_lossy(&self.line_buffer);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            return Ok(Some(LineRecord {
                line_number: self.line_number,
                text: text.to_string(),
                parsed: parse_line(text),
            }));
        }
    }

    /// Read the next successfully parsed event, skipping lines that fail
    pub fn next_event(&mut self) -> Result<Option<LogEvent>> {
        while let Some(record) = self.next_record()? {
            if let Ok(event) = record.parsed {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Number of physical lines consumed so far, blank ones included
    pub const fn lines_read(&self) -> usize {
        self.line_number
    }
}

//! Multi-file access log processing.
//!
//! Runs every input file through the line parser in the order given, with
//! progress display and statistics. Rotated fragments of one log are usually
//! passed together, so all files feed the same handler and, through
//! [`LogProcessor::build_registry`], the same registry.

use crate::access::error::ParseError;
use crate::access::parser::AccessLogReader;
use crate::access::types::LogEvent;
use crate::session::ConnectionRegistry;
use crate::utils::format::format_number;
use crate::utils::progress::ProgressBar;
use crate::utils::reader::file_size;
use anyhow::{Context, Result};

/// Statistics collected during log processing
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStats {
    /// Physical lines read across all files, blank ones included
    pub total_lines: usize,
    /// Lines that produced an event
    pub parsed_entries: usize,
    /// Lines dropped because they could not be parsed
    pub skipped_lines: usize,
    pub files_processed: usize,
}

impl ProcessStats {
    /// Print a summary of processing statistics to stderr
    pub fn report(&self) {
        eprintln!("\nProcessing Summary:");
        eprintln!("  Files processed: {}", self.files_processed);
        eprintln!("  Total lines: {}", format_number(self.total_lines));
        eprintln!("  Parsed entries: {}", format_number(self.parsed_entries));
        if self.skipped_lines > 0 {
            let skip_percentage = (self.skipped_lines as f64 / self.total_lines as f64) * 100.0;
            eprintln!(
                "  Skipped lines: {} ({:.2}%)",
                format_number(self.skipped_lines),
                skip_percentage
            );
        }
    }
}

/// A line that was dropped, handed to the failure callback.
#[derive(Debug)]
pub struct LineFailure<'a> {
    pub file: &'a str,
    /// 1-based line number within `file`
    pub line_number: usize,
    pub text: &'a str,
    pub error: &'a ParseError,
}

/// Reads access log files and hands every parsed event to a handler
pub struct LogProcessor<'a> {
    files: &'a [String],
    progress_label: String,
    show_progress: bool,
}

impl<'a> LogProcessor<'a> {
    /// Create a new log processor for the given files
    pub fn new(files: &'a [String], progress_label: &str) -> Self {
        Self {
            files,
            progress_label: progress_label.to_string(),
            show_progress: true,
        }
    }

    /// Toggle per-file status lines and the progress bar
    #[must_use]
    pub const fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Process all files in order.
    ///
    /// `handler` receives each parsed event; `on_failure` receives every
    /// dropped line. Only I/O errors stop processing.
    pub fn process<F, H>(self, mut handler: F, mut on_failure: H) -> Result<ProcessStats>
    where
        F: FnMut(LogEvent),
        H: FnMut(&LineFailure<'_>),
    {
        let mut stats = ProcessStats::default();

        for (file_idx, log_file) in self.files.iter().enumerate() {
            if self.show_progress {
                eprintln!(
                    "[{}/{}] Processing: {}",
                    file_idx + 1,
                    self.files.len(),
                    log_file
                );
            }

            let size = file_size(log_file);
            let progress = match (self.show_progress, size) {
                (false, _) => None,
                (true, Some(size)) => Some(ProgressBar::new(size, &self.progress_label)),
                (true, None) => Some(ProgressBar::new_spinner(&self.progress_label)),
            };

            let mut reader = AccessLogReader::open(log_file)?;
            let mut bytes_read: u64 = 0;

            while let Some(record) = reader
                .next_record()
                .with_context(|| format!("Failed to read {}", log_file))?
            {
                bytes_read += record.text.len() as u64 + 1;

                if let Some(progress) = &progress {
                    if record.line_number % 10_000 == 0 {
                        match size {
                            // compressed input reads more bytes than the file holds
                            Some(size) => progress.update(bytes_read.min(size)),
                            None => progress.update(record.line_number as u64),
                        }
                    }
                }

                match record.parsed {
                    Ok(event) => {
                        stats.parsed_entries += 1;
                        handler(event);
                    }
                    Err(error) => {
                        stats.skipped_lines += 1;
                        on_failure(&LineFailure {
                            file: log_file,
                            line_number: record.line_number,
                            text: &record.text,
                            error: &error,
                        });
                    }
                }
            }

            stats.total_lines += reader.lines_read();
            stats.files_processed += 1;
            if let Some(progress) = progress {
                progress.finish();
            }
        }

        Ok(stats)
    }

    /// Fold all files into one registry.
    pub fn build_registry<H>(self, on_failure: H) -> Result<(ConnectionRegistry, ProcessStats)>
    where
        H: FnMut(&LineFailure<'_>),
    {
        let mut registry = ConnectionRegistry::new();
        let stats = self.process(|event| registry.apply(event), on_failure)?;
        Ok((registry, stats))
    }
}

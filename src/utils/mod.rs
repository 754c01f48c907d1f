//! Utility functions and helpers.
//!
//! Common plumbing shared by the commands:
//!
//! - [`reader`] - File/stdin reader with automatic decompression
//! - [`processor`] - Multi-file pass with statistics and failure reporting
//! - [`progress`] - Progress bar display
//! - [`format`] - Table cell and number formatting
//! - [`hostname`] - Memoized reverse DNS
//! - [`logging`] - tracing subscriber setup
//!
//! # Examples
//!
//! ## Building a registry from rotated logs
//!
//! ```no_run
//! use ds_access_tools::utils::processor::LogProcessor;
//!
//! let files = vec!["access.20250609.gz".to_string(), "access".to_string()];
//! let (registry, stats) = LogProcessor::new(&files, "Reading")
//!     .build_registry(|failure| eprintln!("{}: {}", failure.line_number, failure.error))
//!     .unwrap();
//! stats.report();
//! println!("{} connections", registry.len());
//! ```

pub mod format;
pub mod hostname;
pub mod logging;
pub mod processor;
pub mod progress;
pub mod reader;

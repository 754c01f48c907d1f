//! Access log line parsing.
//!
//! Turns one raw 389 Directory Server access log line into a typed
//! [`LogEvent`](types::LogEvent):
//!
//! - [`timestamp`] - `[10/Jun/2025:21:18:06.100000Z]` prefix to an absolute instant
//! - [`tokenizer`] - `key=value` attributes and residual free text
//! - [`classifier`] - canonical operation kind plus `conn`/`op` ids
//! - [`parser`] - single-line entry point and a streaming reader
//! - [`types`] / [`error`] - data structures and failure reasons
//!
//! ## Example
//!
//! ```no_run
//! use ds_access_tools::access::parser::AccessLogReader;
//!
//! let mut reader = AccessLogReader::open("access").unwrap();
//! while let Some(event) = reader.next_event().unwrap() {
//!     println!("{} conn={:?} op={:?}", event.kind, event.connection_id, event.operation_id);
//! }
//! ```

pub mod classifier;
pub mod error;
pub mod parser;
pub mod timestamp;
pub mod tokenizer;
pub mod types;

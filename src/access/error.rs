//! Error types for access log line parsing.
//!
//! None of these are fatal to a pass over a log: the reader drops the line,
//! counts it, and optionally reports it through the debug hook.

use thiserror::Error;

/// The bracketed prefix of a line does not follow
/// `DD/Mon/YYYY:HH:MM:SS[.fraction](Z|±HHMM)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampFormatError {
    #[error("malformed timestamp '{0}'")]
    Malformed(String),

    #[error("unknown month abbreviation '{0}'")]
    UnknownMonth(String),

    #[error("missing timezone in timestamp '{0}'")]
    MissingZone(String),

    #[error("invalid timezone '{0}'")]
    InvalidZone(String),

    #[error("timestamp '{0}' is not a valid calendar time")]
    OutOfRange(String),
}

/// Reason a raw line did not produce a [`LogEvent`](super::types::LogEvent).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line does not start with a [timestamp] prefix")]
    LineShape,

    #[error(transparent)]
    TimestampFormat(#[from] TimestampFormatError),
}

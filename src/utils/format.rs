//! Number and text formatting utilities.
//!
//! Shared by the report commands so every table renders numbers, timestamps
//! and missing values the same way.

use chrono::{DateTime, FixedOffset, SecondsFormat};

/// Placeholder for a value the log never provided
pub const NOT_AVAILABLE: &str = "N/A";

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use ds_access_tools::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// ISO-8601 with microseconds and the recorded offset.
///
/// ```
/// use ds_access_tools::access::timestamp::parse_timestamp;
/// use ds_access_tools::utils::format::format_iso;
///
/// let ts = parse_timestamp("10/Jun/2025:11:06:44.711859+0200").unwrap();
/// assert_eq!(format_iso(&ts), "2025-06-10T11:06:44.711859+02:00");
/// ```
pub fn format_iso(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// [`format_iso`], or `N/A` when absent
pub fn format_optional_iso(timestamp: Option<&DateTime<FixedOffset>>) -> String {
    timestamp.map_or_else(|| NOT_AVAILABLE.to_string(), format_iso)
}

/// The value, or `N/A` when absent
pub fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

//! Access log timestamp parsing.
//!
//! 389 Directory Server writes timestamps as `10/Jun/2025:21:18:06.100000Z`
//! or `10/Jun/2025:11:06:44.711859 +0200`. Every timestamp carries its zone,
//! so parsed values are absolute instants that keep the recorded offset.

use super::error::TimestampFormatError;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse the text found between a line's brackets.
///
/// Fractional seconds are kept to microsecond resolution; extra digits are
/// truncated and short fractions are right-padded. Whitespace between the
/// seconds and the zone is tolerated.
///
/// # Examples
///
/// ```
/// use ds_access_tools::access::timestamp::parse_timestamp;
///
/// let ts = parse_timestamp("10/Jun/2025:11:06:44.711859+0200").unwrap();
/// assert_eq!(ts.offset().local_minus_utc(), 2 * 3600);
/// assert_eq!(ts.to_rfc3339(), "2025-06-10T11:06:44.711859+02:00");
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, TimestampFormatError> {
    let text = raw.trim();
    let malformed = || TimestampFormatError::Malformed(text.to_string());

    let (body, offset) = split_zone(text)?;

    let (day, rest) = body.split_once('/').ok_or_else(malformed)?;
    let (month, rest) = rest.split_once('/').ok_or_else(malformed)?;

    let mut clock = rest.split(':');
    let (Some(year), Some(hour), Some(minute), Some(second), None) = (
        clock.next(),
        clock.next(),
        clock.next(),
        clock.next(),
        clock.next(),
    ) else {
        return Err(malformed());
    };

    let (second, fraction) = match second.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (second, None),
    };

    let month = month_number(month)?;
    let day = digits(day).ok_or_else(malformed)?;
    let year = digits(year).ok_or_else(malformed)?;
    let hour = digits(hour).ok_or_else(malformed)?;
    let minute = digits(minute).ok_or_else(malformed)?;
    let second = digits(second).ok_or_else(malformed)?;
    let micros = match fraction {
        Some(fraction) => fraction_micros(fraction).ok_or_else(malformed)?,
        None => 0,
    };

    let year = i32::try_from(year).map_err(|_| malformed())?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_micro_opt(hour, minute, second, micros))
        .ok_or_else(|| TimestampFormatError::OutOfRange(text.to_string()))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimestampFormatError::OutOfRange(text.to_string()))
}

/// Render an instant back into access log form.
///
/// A zero offset is written as `Z`; anything else as `±HHMM`.
pub fn format_log_timestamp(ts: &DateTime<FixedOffset>) -> String {
    let seconds = ts.offset().local_minus_utc();
    let zone = if seconds == 0 {
        "Z".to_string()
    } else {
        let sign = if seconds < 0 { '-' } else { '+' };
        let minutes = seconds.abs() / 60;
        format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
    };
    format!("{}{}", ts.format("%d/%b/%Y:%H:%M:%S%.6f"), zone)
}

fn split_zone(text: &str) -> Result<(&str, FixedOffset), TimestampFormatError> {
    if let Some(body) = text.strip_suffix('Z') {
        return Ok((body.trim_end(), Utc.fix()));
    }

    // The date and clock use only '/', ':' and '.', so a sign can only
    // belong to the zone.
    let Some(sign_at) = text.rfind(['+', '-']) else {
        return Err(TimestampFormatError::MissingZone(text.to_string()));
    };
    let zone = &text[sign_at..];
    let invalid = || TimestampFormatError::InvalidZone(zone.to_string());

    let digits_part = &zone[1..];
    if digits_part.len() != 4 || !digits_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits_part[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits_part[2..].parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }

    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let offset =
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)?;

    Ok((text[..sign_at].trim_end(), offset))
}

fn month_number(name: &str) -> Result<u32, TimestampFormatError> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| TimestampFormatError::UnknownMonth(name.to_string()))
}

fn digits(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn fraction_micros(fraction: &str) -> Option<u32> {
    if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut padded: String = fraction.chars().take(6).collect();
    while padded.len() < 6 {
        padded.push('0');
    }
    padded.parse().ok()
}

//! Splits a raw access log line into timestamp, attributes and free text.
//!
//! ```text
//! [10/Jun/2025:21:18:06.100000Z] conn=100 op=0 BIND dn="uid=test,dc=example,dc=com" method=128
//!  \_________ timestamp ______/  \___ key=value pairs interleaved with free text ____________/
//! ```
//!
//! The message is scanned left to right. A token is an attribute when it
//! starts with a key (`[A-Za-z_][A-Za-z0-9_.-]*`) directly followed by `=`.
//! The value is either a double-quoted run, which may contain `\"`, or the
//! non-whitespace run after `=`. Every token that is not part of an attribute
//! is kept, in order and joined by single spaces, as the free text.

use super::error::ParseError;
use super::timestamp::parse_timestamp;
use super::types::{AttrValue, Attributes, LogEvent};

/// Tokenize one line into an unclassified [`LogEvent`].
///
/// The returned event still has kind `INFO` and no connection or operation
/// id; [`classify`](super::classifier::classify) fills those in.
pub fn tokenize(line: &str) -> Result<LogEvent, ParseError> {
    let (timestamp_text, message) = split_line(line)?;
    let timestamp = parse_timestamp(timestamp_text)?;

    let (pairs, free_text) = scan_message(message);
    let mut attributes = Attributes::default();
    for (key, value) in pairs {
        attributes.insert(key, value);
    }

    Ok(LogEvent::new(timestamp, attributes, free_text))
}

/// Split `[timestamp] message` at the first bracket pair.
pub fn split_line(line: &str) -> Result<(&str, &str), ParseError> {
    let line = line.trim();
    let inner = line.strip_prefix('[').ok_or(ParseError::LineShape)?;
    let (timestamp, message) = inner.split_once(']').ok_or(ParseError::LineShape)?;
    Ok((timestamp, message.trim()))
}

/// Pull `key=value` pairs out of a message, returning them in line order
/// together with the leftover free text.
pub fn scan_message(message: &str) -> (Vec<(&str, AttrValue)>, String) {
    let bytes = message.as_bytes();
    let mut pairs = Vec::new();
    let mut words = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if let Some((key, value, end)) = match_pair(message, pos) {
            pairs.push((key, value));
            pos = end;
            continue;
        }

        let end = word_end(bytes, pos);
        words.push(&message[pos..end]);
        pos = end;
    }

    (pairs, words.join(" "))
}

fn match_pair(message: &str, start: usize) -> Option<(&str, AttrValue, usize)> {
    let bytes = message.as_bytes();

    let first = bytes[start];
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut eq = start + 1;
    while eq < bytes.len() && is_key_byte(bytes[eq]) {
        eq += 1;
    }
    if bytes.get(eq) != Some(&b'=') {
        return None;
    }

    let key = &message[start..eq];
    let value_start = eq + 1;

    if bytes.get(value_start) == Some(&b'"') {
        if let Some(close) = closing_quote(bytes, value_start + 1) {
            let value = &message[value_start + 1..close];
            return Some((key, AttrValue::Str(value.to_string()), close + 1));
        }
    }

    // Unquoted, or a quote that never closes (a truncated line).
    let end = word_end(bytes, value_start);
    Some((key, AttrValue::from_unquoted(&message[value_start..end]), end))
}

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.')
}

fn closing_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn word_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .map_or(bytes.len(), |offset| from + offset)
}

//! Assigns a canonical [`OperationKind`] to a tokenized line.
//!
//! Rules, first match wins:
//!
//! 1. The first free-text word (minus a trailing `-`) names a known kind:
//!    `BIND`, `RESULT`, `SRCH`, `UNBIND`, `EXT`, `ADD`, `DEL`, or
//!    `Disconnect`/`closed`. The rest of the free text is kept.
//! 2. The free text contains `connection from <ip> to <ip>`: the line is
//!    `CONNECTION_INFO` and carries both addresses.
//! 3. Any other free text is `INFO`.
//! 4. No free text at all: a line with `err`, `tag` and `nentries` is a
//!    `RESULT`, anything else `INFO`.
//!
//! Classification never fails.

use super::types::{AttrValue, Endpoints, LogEvent, OperationKind};

/// Fill in kind, connection id and operation id on a freshly tokenized event.
pub fn classify(mut event: LogEvent) -> LogEvent {
    event.connection_id = take_connection_id(&mut event);
    event.operation_id = take_operation_id(&mut event);

    let free_text = std::mem::take(&mut event.free_text);
    if free_text.is_empty() {
        let attrs = &event.attributes;
        event.kind = if attrs.contains("err") && attrs.contains("tag") && attrs.contains("nentries")
        {
            OperationKind::Result
        } else {
            OperationKind::Info
        };
        return event;
    }

    let (first, rest) = match free_text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest),
        None => (free_text.as_str(), ""),
    };
    let candidate = first.strip_suffix('-').unwrap_or(first);

    if let Some(kind) = OperationKind::from_keyword(candidate) {
        event.kind = kind;
        event.free_text = rest
            .trim_start_matches(|c: char| c == '-' || c.is_whitespace())
            .to_string();
    } else if let Some(endpoints) = connection_endpoints(&free_text) {
        event.kind = OperationKind::ConnectionInfo;
        event.endpoints = Some(endpoints);
        event.free_text = free_text;
    } else {
        event.kind = OperationKind::Info;
        event.free_text = free_text;
    }

    event
}

/// Extract addresses from `... connection from <source> to <destination> ...`.
pub fn connection_endpoints(free_text: &str) -> Option<Endpoints> {
    let words: Vec<&str> = free_text.split_whitespace().collect();
    words.windows(5).find_map(|w| match w {
        ["connection", "from", source, "to", destination] => Some(Endpoints {
            source_ip: (*source).to_string(),
            destination_ip: (*destination).to_string(),
        }),
        _ => None,
    })
}

// Ids stay in the attribute map when they are not usable integers, so the
// raw value is not lost.
fn take_connection_id(event: &mut LogEvent) -> Option<u64> {
    match event.attributes.take_extra("conn")? {
        AttrValue::Int(n) if n >= 0 => Some(n as u64),
        other => {
            event.attributes.extra.insert("conn".to_string(), other);
            None
        }
    }
}

fn take_operation_id(event: &mut LogEvent) -> Option<i64> {
    match event.attributes.take_extra("op")? {
        AttrValue::Int(n) => Some(n),
        other => {
            event.attributes.extra.insert("op".to_string(), other);
            None
        }
    }
}

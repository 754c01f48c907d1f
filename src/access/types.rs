//! Data structures for parsed access log lines.
//!
//! A [`LogEvent`] is produced once per line and consumed straight away by the
//! session registry. Attributes that 389 Directory Server writes on most
//! lines (`err`, `tag`, `nentries`, `dn`, `etime`, ...) get typed fields on
//! [`Attributes`]; everything else lands in [`Attributes::extra`].

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical kind of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OperationKind {
    #[serde(rename = "BIND")]
    Bind,
    #[serde(rename = "RESULT")]
    Result,
    #[serde(rename = "SRCH")]
    Search,
    #[serde(rename = "UNBIND")]
    Unbind,
    #[serde(rename = "EXT")]
    Extended,
    #[serde(rename = "ADD")]
    Add,
    #[serde(rename = "DEL")]
    Delete,
    Disconnect,
    #[serde(rename = "CONNECTION_INFO")]
    ConnectionInfo,
    #[serde(rename = "INFO")]
    Info,
}

impl OperationKind {
    /// Map a leading free-text word to a kind, if it names one.
    ///
    /// `closed` is how the server spells a disconnect.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "BIND" => Some(Self::Bind),
            "RESULT" => Some(Self::Result),
            "SRCH" => Some(Self::Search),
            "UNBIND" => Some(Self::Unbind),
            "EXT" => Some(Self::Extended),
            "ADD" => Some(Self::Add),
            "DEL" => Some(Self::Delete),
            "Disconnect" | "closed" => Some(Self::Disconnect),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bind => "BIND",
            Self::Result => "RESULT",
            Self::Search => "SRCH",
            Self::Unbind => "UNBIND",
            Self::Extended => "EXT",
            Self::Add => "ADD",
            Self::Delete => "DEL",
            Self::Disconnect => "Disconnect",
            Self::ConnectionInfo => "CONNECTION_INFO",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value after numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Coerce an unquoted token: `123` and `-1` become integers, `0.000409`
    /// becomes a float, anything else stays a string.
    pub fn from_unquoted(token: &str) -> Self {
        let unsigned = token.strip_prefix('-').unwrap_or(token);
        if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = token.parse() {
                return Self::Int(n);
            }
        } else if is_decimal(unsigned) {
            if let Ok(n) = token.parse() {
                return Self::Float(n);
            }
        }
        Self::Str(token.to_string())
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            Self::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

fn is_decimal(text: &str) -> bool {
    let Some((whole, fraction)) = text.split_once('.') else {
        return false;
    };
    !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Attributes of one log line.
///
/// Serializes as one flat map, the same shape the line had.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    /// LDAP result code; 0 means success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<i64>,
    /// BER tag of the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nentries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wtime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etime: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttrValue>,
}

impl Attributes {
    /// Store a value under `key`.
    ///
    /// A well-known key whose value has the wrong shape (say `err=abc`) is
    /// kept in `extra` instead of being dropped. The first value for a key
    /// wins.
    pub fn insert(&mut self, key: &str, value: AttrValue) {
        if self.contains(key) {
            return;
        }
        match key {
            "err" => set_int(&mut self.err, &mut self.extra, key, value),
            "tag" => set_int(&mut self.tag, &mut self.extra, key, value),
            "nentries" => set_int(&mut self.nentries, &mut self.extra, key, value),
            "method" => set_int(&mut self.method, &mut self.extra, key, value),
            "version" => set_int(&mut self.version, &mut self.extra, key, value),
            "scope" => set_int(&mut self.scope, &mut self.extra, key, value),
            "wtime" => set_float(&mut self.wtime, &mut self.extra, key, value),
            "optime" => set_float(&mut self.optime, &mut self.extra, key, value),
            "etime" => set_float(&mut self.etime, &mut self.extra, key, value),
            "dn" => self.dn = Some(value.to_string()),
            "base" => self.base = Some(value.to_string()),
            "filter" => self.filter = Some(value.to_string()),
            "details" => self.details = Some(value.to_string()),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Look up any attribute by its name on the line.
    pub fn get(&self, key: &str) -> Option<AttrValue> {
        let int = |v: Option<i64>| v.map(AttrValue::Int);
        let float = |v: Option<f64>| v.map(AttrValue::Float);
        let text = |v: &Option<String>| v.clone().map(AttrValue::Str);
        match key {
            "err" if self.err.is_some() => int(self.err),
            "tag" if self.tag.is_some() => int(self.tag),
            "nentries" if self.nentries.is_some() => int(self.nentries),
            "method" if self.method.is_some() => int(self.method),
            "version" if self.version.is_some() => int(self.version),
            "scope" if self.scope.is_some() => int(self.scope),
            "wtime" if self.wtime.is_some() => float(self.wtime),
            "optime" if self.optime.is_some() => float(self.optime),
            "etime" if self.etime.is_some() => float(self.etime),
            "dn" if self.dn.is_some() => text(&self.dn),
            "base" if self.base.is_some() => text(&self.base),
            "filter" if self.filter.is_some() => text(&self.filter),
            "details" if self.details.is_some() => text(&self.details),
            _ => self.extra.get(key).cloned(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove an attribute from the residual map.
    pub fn take_extra(&mut self, key: &str) -> Option<AttrValue> {
        self.extra.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn set_int(
    slot: &mut Option<i64>,
    extra: &mut BTreeMap<String, AttrValue>,
    key: &str,
    value: AttrValue,
) {
    match value.as_int() {
        Some(n) => *slot = Some(n),
        None => {
            extra.insert(key.to_string(), value);
        }
    }
}

fn set_float(
    slot: &mut Option<f64>,
    extra: &mut BTreeMap<String, AttrValue>,
    key: &str,
    value: AttrValue,
) {
    match value.as_float() {
        Some(n) => *slot = Some(n),
        None => {
            extra.insert(key.to_string(), value);
        }
    }
}

/// Addresses from a `connection from <ip> to <ip>` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    pub source_ip: String,
    pub destination_ip: String,
}

/// One parsed access log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<FixedOffset>,
    /// `conn=` value; absent on informational lines
    pub connection_id: Option<u64>,
    /// `op=` value; `-1` marks a connection-scoped line such as a disconnect
    pub operation_id: Option<i64>,
    pub kind: OperationKind,
    pub attributes: Attributes,
    pub free_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Endpoints>,
}

impl LogEvent {
    /// An unclassified event straight from the tokenizer.
    pub fn new(timestamp: DateTime<FixedOffset>, attributes: Attributes, free_text: String) -> Self {
        Self {
            timestamp,
            connection_id: None,
            operation_id: None,
            kind: OperationKind::Info,
            attributes,
            free_text,
            endpoints: None,
        }
    }
}

//! Per-connection session records.
//!
//! Both types are built only by [`ConnectionRegistry`](super::registry::ConnectionRegistry),
//! which enforces the lifecycle rules; callers get shared references.

use crate::access::types::{Attributes, LogEvent, OperationKind};
use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One operation (BIND, SRCH, ...) within a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub operation_id: i64,
    pub kind: OperationKind,
    pub timestamp: DateTime<FixedOffset>,
    pub attributes: Attributes,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub free_text: String,
    /// Attributes of the RESULT line answering this operation
    pub result: Option<Attributes>,
}

impl Operation {
    pub(crate) fn from_event(operation_id: i64, event: LogEvent) -> Self {
        Self {
            operation_id,
            kind: event.kind,
            timestamp: event.timestamp,
            attributes: event.attributes,
            free_text: event.free_text,
            result: None,
        }
    }

    /// LDAP result code, once a RESULT has been seen
    pub fn result_code(&self) -> Option<i64> {
        self.result.as_ref()?.err
    }
}

/// A client connection and everything observed on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub id: u64,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    /// DN of the first successful bind
    pub bind_dn: Option<String>,
    /// Timestamp of the BIND line (not its RESULT) that succeeded
    pub bind_timestamp: Option<DateTime<FixedOffset>>,
    /// Timestamp of the first disconnect line
    pub unbind_timestamp: Option<DateTime<FixedOffset>>,
    pub successful_bind: bool,
    #[serde(serialize_with = "operations_in_order")]
    pub operations: BTreeMap<i64, Operation>,
}

impl Connection {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            source_ip: None,
            destination_ip: None,
            bind_dn: None,
            bind_timestamp: None,
            unbind_timestamp: None,
            successful_bind: false,
            operations: BTreeMap::new(),
        }
    }

    /// No disconnect has been logged yet
    pub const fn is_open(&self) -> bool {
        self.unbind_timestamp.is_none()
    }

    pub fn operation(&self, operation_id: i64) -> Option<&Operation> {
        self.operations.get(&operation_id)
    }

    /// Operations ordered by operation id
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Number of operations that have received a RESULT
    pub fn answered_operations(&self) -> usize {
        self.operations().filter(|op| op.result.is_some()).count()
    }
}

fn operations_in_order<S: Serializer>(
    operations: &BTreeMap<i64, Operation>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(operations.values())
}

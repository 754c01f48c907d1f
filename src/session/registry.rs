//! Folds parsed events into per-connection sessions.
//!
//! The registry is a deterministic reducer: applying the same events in the
//! same order always yields the same registry. Correlation rules:
//!
//! - Events without a connection id change nothing.
//! - `CONNECTION_INFO` sets the source/destination addresses once.
//! - `Disconnect` sets the unbind timestamp once.
//! - `RESULT` attaches to an existing operation with the same id, replacing
//!   any earlier result, and never creates one. The first successful
//!   (`err=0`) result for a BIND marks the connection bound, using the
//!   BIND's own timestamp and DN.
//! - Any other event with a non-negative operation id creates the operation
//!   unless the id is already taken; the first line wins.
//!
//! Operations and results that arrive after a disconnect are still folded.

use super::model::{Connection, Operation};
use crate::access::types::{Attributes, LogEvent, OperationKind};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::trace;

/// Connection id to session mapping built from one pass over a log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionRegistry {
    connections: BTreeMap<u64, Connection>,
}

impl Serialize for ConnectionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.connections.values())
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an ordered event sequence
    pub fn from_events<I: IntoIterator<Item = LogEvent>>(events: I) -> Self {
        let mut registry = Self::new();
        registry.extend(events);
        registry
    }

    /// Fold one event into the registry.
    pub fn apply(&mut self, event: LogEvent) {
        let Some(connection_id) = event.connection_id else {
            return;
        };
        let connection = self
            .connections
            .entry(connection_id)
            .or_insert_with(|| Connection::new(connection_id));

        match event.kind {
            OperationKind::ConnectionInfo => {
                if let Some(endpoints) = event.endpoints {
                    if connection.source_ip.is_none() && connection.destination_ip.is_none() {
                        connection.source_ip = Some(endpoints.source_ip);
                        connection.destination_ip = Some(endpoints.destination_ip);
                    }
                }
            }
            OperationKind::Disconnect => {
                if connection.unbind_timestamp.is_none() {
                    connection.unbind_timestamp = Some(event.timestamp);
                }
            }
            kind => {
                // Negative ids (op=-1) are connection-scoped lines with no operation.
                let Some(operation_id) = event.operation_id.filter(|id| *id >= 0) else {
                    return;
                };
                if kind == OperationKind::Result {
                    record_result(connection, operation_id, event.attributes);
                } else if connection.operations.contains_key(&operation_id) {
                    trace!(
                        conn = connection_id,
                        op = operation_id,
                        "duplicate operation ignored"
                    );
                } else {
                    connection
                        .operations
                        .insert(operation_id, Operation::from_event(operation_id, event));
                }
            }
        }
    }

    pub fn get(&self, connection_id: u64) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Connections ordered by connection id
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Keep only the connections matching `keep`
    pub fn retain<F: FnMut(&Connection) -> bool>(&mut self, mut keep: F) {
        self.connections.retain(|_, connection| keep(connection));
    }
}

fn record_result(connection: &mut Connection, operation_id: i64, attributes: Attributes) {
    let Some(operation) = connection.operations.get_mut(&operation_id) else {
        trace!(conn = connection.id, op = operation_id, "orphan RESULT dropped");
        return;
    };

    if operation.kind == OperationKind::Bind
        && attributes.err == Some(0)
        && !connection.successful_bind
    {
        connection.successful_bind = true;
        connection.bind_timestamp = Some(operation.timestamp);
        connection.bind_dn = attributes
            .dn
            .clone()
            .or_else(|| operation.attributes.dn.clone());
    }

    // SASL binds answer err=14 before the final err=0; keep the latest.
    operation.result = Some(attributes);
}

impl Extend<LogEvent> for ConnectionRegistry {
    fn extend<I: IntoIterator<Item = LogEvent>>(&mut self, events: I) {
        for event in events {
            self.apply(event);
        }
    }
}

impl FromIterator<LogEvent> for ConnectionRegistry {
    fn from_iter<I: IntoIterator<Item = LogEvent>>(events: I) -> Self {
        Self::from_events(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::parser::parse_line;
    use crate::access::timestamp::parse_timestamp;

    fn events(lines: &[&str]) -> Vec<LogEvent> {
        lines.iter().map(|l| parse_line(l).unwrap()).collect()
    }

    fn build(lines: &[&str]) -> ConnectionRegistry {
        ConnectionRegistry::from_events(events(lines))
    }

    const BIND: &str = r#"[10/Jun/2025:21:18:06.100000Z] conn=100 op=0 BIND dn="uid=test,ou=people,dc=example,dc=com" method=128 version=3"#;
    const BIND_OK: &str =
        "[10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=0 tag=97 nentries=1 etime=0.0";
    const CLOSED: &str = "[10/Jun/2025:21:18:07.200000Z] conn=100 op=-1 fd=12 closed";

    #[test]
    fn test_successful_bind_uses_bind_timestamp() {
        let registry = build(&[BIND, BIND_OK]);
        let conn = registry.get(100).unwrap();

        assert!(conn.successful_bind);
        assert_eq!(conn.bind_dn.as_deref(), Some("uid=test,ou=people,dc=example,dc=com"));
        assert_eq!(
            conn.bind_timestamp,
            Some(parse_timestamp("10/Jun/2025:21:18:06.100000Z").unwrap())
        );
        assert_eq!(conn.operation(0).unwrap().result_code(), Some(0));
    }

    #[test]
    fn test_disconnect_sets_unbind_once() {
        let later = "[10/Jun/2025:21:19:00.000000Z] conn=100 op=-1 fd=12 closed";
        let registry = build(&[BIND, CLOSED, later]);
        let conn = registry.get(100).unwrap();

        assert_eq!(
            conn.unbind_timestamp,
            Some(parse_timestamp("10/Jun/2025:21:18:07.200000Z").unwrap())
        );
        assert!(!conn.is_open());
        assert_eq!(conn.operations.len(), 1);
    }

    #[test]
    fn test_failed_bind_is_not_bound() {
        let failed = "[10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=49 tag=97 nentries=0 etime=0.0";
        let registry = build(&[BIND, failed]);
        let conn = registry.get(100).unwrap();

        assert!(!conn.successful_bind);
        assert_eq!(conn.bind_dn, None);
        assert_eq!(conn.bind_timestamp, None);
        assert_eq!(conn.operation(0).unwrap().result_code(), Some(49));
    }

    #[test]
    fn test_bind_dn_prefers_result_dn() {
        let result = r#"[10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=0 tag=97 nentries=0 dn="uid=canonical,dc=example,dc=com""#;
        let registry = build(&[BIND, result]);
        assert_eq!(
            registry.get(100).unwrap().bind_dn.as_deref(),
            Some("uid=canonical,dc=example,dc=com")
        );
    }

    #[test]
    fn test_result_for_non_bind_does_not_bind() {
        let registry = build(&[
            r#"[10/Jun/2025:21:18:06Z] conn=4 op=1 SRCH base="dc=example,dc=com" scope=2 filter="(uid=x)""#,
            "[10/Jun/2025:21:18:06Z] conn=4 op=1 RESULT err=0 tag=101 nentries=1 etime=0.1",
        ]);
        let conn = registry.get(4).unwrap();
        assert!(!conn.successful_bind);
        assert_eq!(conn.operation(1).unwrap().kind, OperationKind::Search);
        assert!(conn.operation(1).unwrap().result.is_some());
    }

    #[test]
    fn test_repeated_result_is_idempotent() {
        let mut registry = build(&[BIND, BIND_OK]);
        let before = registry.clone();

        registry.apply(parse_line(BIND_OK).unwrap());
        assert_eq!(registry, before);
    }

    #[test]
    fn test_sasl_bind_in_progress_then_success() {
        let in_progress = "[10/Jun/2025:21:18:06.150000Z] conn=100 op=0 RESULT err=14 tag=97 nentries=0";
        let registry = build(&[BIND, in_progress, BIND_OK]);
        let conn = registry.get(100).unwrap();

        assert!(conn.successful_bind);
        assert_eq!(conn.operation(0).unwrap().result_code(), Some(0));
        assert_eq!(
            conn.bind_timestamp,
            Some(parse_timestamp("10/Jun/2025:21:18:06.100000Z").unwrap())
        );
    }

    #[test]
    fn test_later_failure_does_not_unbind() {
        let failed = "[10/Jun/2025:21:18:06.300000Z] conn=100 op=0 RESULT err=49 tag=97 nentries=0";
        let registry = build(&[BIND, BIND_OK, failed]);
        let conn = registry.get(100).unwrap();

        assert!(conn.successful_bind);
        assert_eq!(conn.bind_dn.as_deref(), Some("uid=test,ou=people,dc=example,dc=com"));
        assert_eq!(conn.operation(0).unwrap().result_code(), Some(49));
    }

    #[test]
    fn test_second_successful_bind_does_not_override_first() {
        let rebind = r#"[10/Jun/2025:21:18:08Z] conn=100 op=1 BIND dn="uid=other,dc=example,dc=com" method=128 version=3"#;
        let rebind_ok = "[10/Jun/2025:21:18:08Z] conn=100 op=1 RESULT err=0 tag=97 nentries=0";
        let registry = build(&[BIND, BIND_OK, rebind, rebind_ok]);
        let conn = registry.get(100).unwrap();

        assert_eq!(conn.bind_dn.as_deref(), Some("uid=test,ou=people,dc=example,dc=com"));
        assert!(conn.operation(1).unwrap().result.is_some());
    }

    #[test]
    fn test_orphan_result_creates_no_operation() {
        let orphan = "[10/Jun/2025:21:18:06Z] conn=7 op=3 RESULT err=0 tag=97 nentries=0";
        let registry = build(&[orphan]);
        let conn = registry.get(7).unwrap();

        assert!(conn.operations.is_empty());
        assert!(!conn.successful_bind);
    }

    #[test]
    fn test_duplicate_operation_first_wins() {
        let duplicate = r#"[10/Jun/2025:21:18:06.150000Z] conn=100 op=0 BIND dn="uid=impostor,dc=example,dc=com" method=128 version=3"#;
        let registry = build(&[BIND, duplicate, BIND_OK]);
        let conn = registry.get(100).unwrap();
        let op = conn.operation(0).unwrap();

        assert_eq!(conn.operations.len(), 1);
        assert_eq!(op.attributes.dn.as_deref(), Some("uid=test,ou=people,dc=example,dc=com"));
        assert_eq!(op.timestamp, parse_timestamp("10/Jun/2025:21:18:06.100000Z").unwrap());
        assert!(conn.successful_bind);
        assert_eq!(conn.bind_dn.as_deref(), Some("uid=test,ou=people,dc=example,dc=com"));
    }

    #[test]
    fn test_events_without_connection_are_ignored() {
        let registry = build(&[
            "[10/Jun/2025:21:18:06Z] - 389-Directory/2.4.0 starting up",
            "[10/Jun/2025:21:18:06Z] op=1 UNBIND",
        ]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_connection_info_sets_addresses_once() {
        let registry = build(&[
            "[10/Jun/2025:21:18:05Z] conn=100 fd=12 slot=12 connection from 192.168.1.10 to 192.168.1.1",
            "[10/Jun/2025:21:18:05Z] conn=100 fd=12 slot=12 connection from 10.9.9.9 to 10.0.0.1",
            BIND,
        ]);
        let conn = registry.get(100).unwrap();
        assert_eq!(conn.source_ip.as_deref(), Some("192.168.1.10"));
        assert_eq!(conn.destination_ip.as_deref(), Some("192.168.1.1"));
        assert_eq!(conn.operations.len(), 1);
    }

    #[test]
    fn test_connection_scoped_lines_are_not_operations() {
        let registry = build(&[
            "[10/Jun/2025:21:18:06Z] conn=8 op=-1 fd=64 some notice",
            "[10/Jun/2025:21:18:06Z] conn=8 TLS1.2 128-bit AES-GCM",
        ]);
        let conn = registry.get(8).unwrap();
        assert!(conn.operations.is_empty());
    }

    #[test]
    fn test_info_operations_are_kept() {
        let registry = build(&[
            r#"[10/Jun/2025:21:18:06Z] conn=9 op=2 MOD dn="cn=x,dc=example,dc=com""#,
            "[10/Jun/2025:21:18:06Z] conn=9 op=2 RESULT err=0 tag=103 nentries=0",
        ]);
        let op = registry.get(9).unwrap().operation(2).unwrap();
        assert_eq!(op.kind, OperationKind::Info);
        assert_eq!(op.free_text, "MOD");
        assert_eq!(op.result_code(), Some(0));
    }

    #[test]
    fn test_results_after_close_are_folded() {
        let registry = build(&[
            "[10/Jun/2025:21:18:06Z] conn=5 op=1 UNBIND",
            "[10/Jun/2025:21:18:06Z] conn=5 op=-1 fd=64 closed - U1",
            r#"[10/Jun/2025:21:18:07Z] conn=5 op=0 BIND dn="cn=late" method=128 version=3"#,
            "[10/Jun/2025:21:18:07Z] conn=5 op=0 RESULT err=0 tag=97 nentries=0",
        ]);
        let conn = registry.get(5).unwrap();
        assert!(!conn.is_open());
        assert!(conn.successful_bind);
        assert_eq!(conn.operations.len(), 2);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let lines = [
            "[10/Jun/2025:21:18:05Z] conn=100 fd=12 slot=12 connection from 192.168.1.10 to 192.168.1.1",
            BIND,
            BIND_OK,
            "[10/Jun/2025:21:18:06Z] conn=101 op=0 UNBIND",
            CLOSED,
        ];
        assert_eq!(build(&lines), build(&lines));

        let mut incremental = ConnectionRegistry::new();
        for event in events(&lines) {
            incremental.apply(event);
        }
        assert_eq!(incremental, build(&lines));
    }

    #[test]
    fn test_operations_serialize_in_id_order() {
        let registry = build(&[
            "[10/Jun/2025:21:18:06Z] conn=1 op=10 UNBIND",
            "[10/Jun/2025:21:18:06Z] conn=1 op=2 UNBIND",
        ]);
        let json = serde_json::to_value(&registry).unwrap();
        let ops = json[0]["operations"].as_array().unwrap();
        assert_eq!(ops[0]["operation_id"], 2);
        assert_eq!(ops[1]["operation_id"], 10);
    }
}

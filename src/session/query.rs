//! Reporting views over a finished registry.
//!
//! Every view is a pure function of the registry; ordering is part of the
//! contract so reports are stable across runs.

use super::model::{Connection, Operation};
use super::registry::ConnectionRegistry;
use crate::access::types::OperationKind;
use std::collections::{BTreeSet, HashSet};

/// `details` value a RESULT carries when a search ran without a usable index
pub const PARTIALLY_UNINDEXED: &str = "Partially Unindexed Filter";

/// A search flagged as partially unindexed, with its connection.
#[derive(Debug, Clone, Copy)]
pub struct UnindexedSearch<'a> {
    pub connection: &'a Connection,
    pub operation: &'a Operation,
}

impl ConnectionRegistry {
    /// Connections that bound successfully and were later closed, ordered by
    /// bind timestamp.
    pub fn completed_binds(&self) -> Vec<&Connection> {
        let mut connections: Vec<&Connection> = self
            .connections()
            .filter(|c| c.successful_bind && c.bind_timestamp.is_some())
            .filter(|c| c.unbind_timestamp.is_some())
            .collect();
        connections.sort_by_key(|c| (c.bind_timestamp, c.id));
        connections
    }

    /// Connections with no disconnect yet, bound or not.
    ///
    /// Bound connections come first, ordered by bind timestamp; the rest
    /// follow by connection id.
    pub fn open_connections(&self) -> Vec<&Connection> {
        let mut connections: Vec<&Connection> =
            self.connections().filter(|c| c.is_open()).collect();
        connections.sort_by_key(|c| (c.bind_timestamp.is_none(), c.bind_timestamp, c.id));
        connections
    }

    /// Distinct source addresses, sorted
    pub fn unique_clients(&self) -> BTreeSet<&str> {
        self.connections()
            .filter_map(|c| c.source_ip.as_deref())
            .collect()
    }

    /// Searches whose RESULT reported a partially unindexed filter, oldest first
    pub fn unindexed_searches(&self) -> Vec<UnindexedSearch<'_>> {
        let mut searches: Vec<UnindexedSearch<'_>> = self
            .connections()
            .flat_map(|connection| {
                connection
                    .operations()
                    .filter(|op| op.kind == OperationKind::Search)
                    .filter(|op| {
                        op.result
                            .as_ref()
                            .and_then(|r| r.details.as_deref())
                            .is_some_and(|d| d == PARTIALLY_UNINDEXED)
                    })
                    .map(move |operation| UnindexedSearch {
                        connection,
                        operation,
                    })
            })
            .collect();
        searches.sort_by_key(|s| (s.operation.timestamp, s.connection.id, s.operation.operation_id));
        searches
    }

    /// Keep only connections whose source address is in `source_ips`.
    ///
    /// Connections without a known source address are dropped.
    pub fn filter_by_source_ips(mut self, source_ips: &HashSet<String>) -> Self {
        self.retain(|c| {
            c.source_ip
                .as_ref()
                .is_some_and(|ip| source_ips.contains(ip))
        });
        self
    }
}

//! # DS Access Tools
//!
//! Command-line tools and a library for analyzing 389 Directory Server
//! access logs by reconstructing client sessions.
//!
//! ## Overview
//!
//! The access log records one line per event: connection accepted, BIND,
//! SRCH, RESULT, disconnect and so on, each tagged with a connection number
//! (`conn=`) and an operation number (`op=`). Lines of many concurrent
//! connections are interleaved. This crate parses every line into a typed
//! event and folds the events, in log order, into one record per connection
//! holding its client address, bind identity and timing, and every operation
//! with the RESULT that answered it.
//!
//! ```text
//! [10/Jun/2025:21:18:05.000000Z] conn=100 fd=64 slot=64 connection from 192.168.1.10 to 192.168.1.1
//! [10/Jun/2025:21:18:06.100000Z] conn=100 op=0 BIND dn="uid=test,ou=people,dc=example,dc=com" method=128 version=3
//! [10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=0 tag=97 nentries=1 etime=0.0
//! [10/Jun/2025:21:18:07.200000Z] conn=100 op=-1 fd=64 closed - U1
//! ```
//!
//! ## Features
//!
//! - **Best-effort parsing** - malformed or foreign lines are dropped and counted, never fatal
//! - **Session reconstruction** - bind identity, bind/unbind times, per-operation results
//! - **Rotated logs** - several files, plain or `.gz`/`.zst`, feed one session model
//! - **Reports** - completed sessions, open connections, unique clients, unindexed searches
//! - **Export** - full model as JSON or CSV
//! - **Shell completion** for bash, zsh, fish, powershell, and elvish
//!
//! ## Architecture
//!
//! - [`access`] - Line parsing: timestamp, attributes, operation classification
//! - [`session`] - Connection registry and reporting views
//! - [`commands`] - Individual report command implementations
//! - [`utils`] - Shared utilities (input decompression, progress, formatting, DNS, logging)
//!
//! ## Example Usage
//!
//! ```bash
//! # Sessions that bound and closed, oldest first
//! ds-access src-ip-table /var/log/dirsrv/slapd-example/access
//!
//! # Rotated logs in order, restricted to two clients
//! ds-access open-connections access.2025060*.gz access --filter-client-ip 10.0.0.5,10.0.0.6
//!
//! # Find searches that need an index
//! ds-access unindexed-searches access --debug
//! ```
//!
//! ## Library Usage
//!
//! ```
//! use ds_access_tools::access::parser::parse_line;
//! use ds_access_tools::session::ConnectionRegistry;
//!
//! let lines = [
//!     r#"[10/Jun/2025:21:18:06.100000Z] conn=100 op=0 BIND dn="uid=test,dc=example,dc=com" method=128 version=3"#,
//!     "[10/Jun/2025:21:18:06.200000Z] conn=100 op=0 RESULT err=0 tag=97 nentries=1 etime=0.0",
//! ];
//! let registry: ConnectionRegistry = lines.iter().filter_map(|l| parse_line(l).ok()).collect();
//!
//! let conn = registry.get(100).unwrap();
//! assert!(conn.successful_bind);
//! assert_eq!(conn.bind_dn.as_deref(), Some("uid=test,dc=example,dc=com"));
//! ```

pub mod access;
pub mod commands;
pub mod session;
pub mod utils;

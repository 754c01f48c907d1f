//! Session reconstruction.
//!
//! [`ConnectionRegistry`] folds classified events, in log order, into one
//! [`Connection`] per `conn` id with its operations and their results.
//! [`query`] holds the reporting views built on top of a finished registry.

pub mod model;
pub mod query;
pub mod registry;

pub use model::{Connection, Operation};
pub use registry::ConnectionRegistry;

//! # dbal
//!
//! A fluent, dialect-aware SQL query builder and result-typing layer for
//! SQL Server and MySQL.
//!
//! ## Features
//!
//! - **One builder, many backends**: dialect rules (escaping, paging,
//!   column classification) are injected as a [`Dialect`] capability, so a
//!   single [`Db`] implementation serves every backend
//! - **Fluent clause building**: `select`/`where_*`/`group_by`/`order_by`/
//!   `limit`/`page` chain on one handle; `to_sql()` is pure and idempotent
//! - **Record access**: cardinality-checked `find`/`delete` and diff-based
//!   `update` that writes only changed fields
//! - **Result typing**: GUID blobs, datetime strings and numeric strings
//!   are reclassified once per result set and converted on every row
//! - **Fresh connection per statement**: no pooling, no session leakage;
//!   the returned result set owns its cursor and handle
//! - **Query monitoring**: a [`QueryMonitor`] seam for timing and logging
//!   every dispatched statement
//!
//! ## Usage
//!
//! ```ignore
//! use dbal::{Db, Mssql, Record};
//! use std::sync::Arc;
//!
//! let mut db = Db::new(Arc::new(Mssql::new()), Box::new(connector));
//!
//! // SELECT
//! let rows = db
//!     .table("users")
//!     .where_eq("status", "active")
//!     .order_by("created DESC")
//!     .limit(20)
//!     .execute()?
//!     .all()?;
//!
//! // Single-row lookup by primary key
//! let user = db.table("users").find(42)?;
//!
//! // INSERT
//! db.table("users")
//!     .insert(&Record::new().set("name", "alice").set("active", true))?;
//!
//! // Diff-based UPDATE: only changed fields are written
//! db.table("users").update(&record)?;
//! ```

pub mod builder;
pub mod config;
pub mod connection;
pub mod db;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod monitor;
pub mod result;
pub mod value;

mod typing;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::QueryBuilder;
pub use config::{ConnectionConfig, parse_connection_map};
pub use connection::{ColumnMeta, Connection, Connector, Cursor};
pub use db::{Db, IntoValues, Record, UpdateOutcome};
pub use dialect::{ColumnClass, Dialect, Mssql, Mysql};
pub use error::{DbalError, DbalResult};
pub use expr::{Cond, OPERATORS};
#[cfg(feature = "tracing")]
pub use monitor::LoggingMonitor;
pub use monitor::{NoopMonitor, QueryContext, QueryMonitor, QueryResult, QueryType};
pub use result::{ResultSet, Row};
pub use value::Value;

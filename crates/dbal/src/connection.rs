//! Capability traits for the driver boundary.
//!
//! The core never dials a server itself. Each dialect's physical driver is
//! wrapped behind three narrow traits: a [`Connector`] that opens handles, a
//! [`Connection`] that runs one statement, and a [`Cursor`] over the result.
//!
//! Lifecycle contract: a fresh connection is opened for every executed
//! statement, the returned cursor takes ownership of the handle, and the
//! handle is torn down when the cursor is dropped. There is no pooling and
//! no reuse across statements, so a later query can never inherit an
//! earlier query's session state.

use crate::config::ConnectionConfig;
use crate::error::DbalResult;
use crate::value::Value;

/// Metadata for one result-set column, as reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Driver-reported native type name (e.g. `datetime`, `int`, `blob`).
    pub native_type: String,
    /// Declared maximum length in bytes, or -1 when unknown.
    pub max_length: i64,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>, max_length: i64) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            max_length,
        }
    }
}

/// Opens database handles on demand.
pub trait Connector: Send + Sync {
    /// Open a fresh connection, optionally using the active named
    /// configuration.
    fn open(&self, config: Option<&ConnectionConfig>) -> DbalResult<Box<dyn Connection>>;
}

/// One open database handle, good for a single statement.
pub trait Connection: Send {
    /// Run a session-setup statement that produces no result set.
    fn run(&mut self, sql: &str) -> DbalResult<()>;

    /// Execute a statement, consuming the handle. The returned cursor owns
    /// the handle and closes it on drop.
    fn execute(self: Box<Self>, sql: &str) -> DbalResult<Box<dyn Cursor>>;
}

/// Forward-only iteration over a statement's result rows.
pub trait Cursor: Send {
    /// Number of columns in the result set.
    fn field_count(&self) -> usize;

    /// Number of rows in the result set, as reported by the driver.
    fn row_count(&self) -> usize;

    /// Metadata for the column at `index`.
    fn column_meta(&self, index: usize) -> &ColumnMeta;

    /// Fetch the next row, or `None` at end of set. Values arrive untyped;
    /// the typing pipeline reclassifies them.
    fn next_row(&mut self) -> DbalResult<Option<Vec<Value>>>;
}

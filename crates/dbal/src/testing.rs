//! Scripted in-memory connector used by unit tests.

use crate::config::ConnectionConfig;
use crate::connection::{ColumnMeta, Connection, Connector, Cursor};
use crate::error::DbalResult;
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted result set.
pub(crate) struct TestResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
}

impl TestResult {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// A connector that pops pre-scripted results in order and records every
/// opened connection, session-setup statement and executed SQL string.
/// Clones share state, so a test can keep one handle for assertions after
/// moving another into `Db`.
#[derive(Clone, Default)]
pub(crate) struct TestConnector {
    results: Arc<Mutex<VecDeque<TestResult>>>,
    executed: Arc<Mutex<Vec<String>>>,
    setup: Arc<Mutex<Vec<String>>>,
    opens: Arc<Mutex<usize>>,
}

impl TestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result set for the next executed statement.
    pub fn push_result(&self, result: TestResult) {
        self.results.lock().unwrap().push_back(result);
    }

    /// All executed SQL strings, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// All session-setup statements run, in order.
    pub fn setup_statements(&self) -> Vec<String> {
        self.setup.lock().unwrap().clone()
    }

    /// How many connections were opened.
    pub fn open_count(&self) -> usize {
        *self.opens.lock().unwrap()
    }
}

impl Connector for TestConnector {
    fn open(&self, _config: Option<&ConnectionConfig>) -> DbalResult<Box<dyn Connection>> {
        *self.opens.lock().unwrap() += 1;
        Ok(Box::new(TestConnection {
            owner: self.clone(),
        }))
    }
}

struct TestConnection {
    owner: TestConnector,
}

impl Connection for TestConnection {
    fn run(&mut self, sql: &str) -> DbalResult<()> {
        self.owner.setup.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    fn execute(self: Box<Self>, sql: &str) -> DbalResult<Box<dyn Cursor>> {
        self.owner.executed.lock().unwrap().push(sql.to_string());
        let result = self
            .owner
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(TestResult::empty);
        Ok(Box::new(TestCursor::new(result.columns, result.rows)))
    }
}

/// A cursor over in-memory rows.
pub(crate) struct TestCursor {
    columns: Vec<ColumnMeta>,
    rows: VecDeque<Vec<Value>>,
    total: usize,
}

impl TestCursor {
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Vec<Value>>) -> Self {
        let total = rows.len();
        Self {
            columns,
            rows: rows.into(),
            total,
        }
    }
}

impl Cursor for TestCursor {
    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self) -> usize {
        self.total
    }

    fn column_meta(&self, index: usize) -> &ColumnMeta {
        &self.columns[index]
    }

    fn next_row(&mut self) -> DbalResult<Option<Vec<Value>>> {
        Ok(self.rows.pop_front())
    }
}

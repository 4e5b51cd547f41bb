//! Result sets and rows.
//!
//! A [`ResultSet`] wraps the live cursor returned by an execute call. All
//! result-shape accessors (`all`, `first`, `pluck`, `value`, ...) route
//! through one fetch primitive with a first-only flag; the typing pipeline
//! runs lazily on the first fetch and its classification map is cached for
//! the remaining rows of the set.

use crate::connection::Cursor;
use crate::dialect::Dialect;
use crate::error::DbalResult;
use crate::typing::TypeMap;
use crate::value::Value;
use std::sync::Arc;

/// One fetched row: converted values addressable by column name or by
/// position. The column header is shared across all rows of a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column names, in result-set order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Get a value by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values, in result-set order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The live handle over one executed statement's rows.
pub struct ResultSet {
    cursor: Box<dyn Cursor>,
    dialect: Arc<dyn Dialect>,
    columns: Option<Arc<[String]>>,
    types: Option<TypeMap>,
    fetched: Vec<Row>,
    done: bool,
}

impl std::fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("columns", &self.columns)
            .field("types", &self.types)
            .field("fetched", &self.fetched)
            .field("done", &self.done)
            .finish()
    }
}

impl ResultSet {
    pub(crate) fn new(cursor: Box<dyn Cursor>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            cursor,
            dialect,
            columns: None,
            types: None,
            fetched: Vec::new(),
            done: false,
        }
    }

    /// Number of rows in the result set, as reported by the driver.
    pub fn count(&self) -> usize {
        self.cursor.row_count()
    }

    /// Number of columns in the result set.
    pub fn field_count(&self) -> usize {
        self.cursor.field_count()
    }

    /// The shared fetch primitive. Builds the column header and
    /// classification map on first use, then pulls and converts rows until
    /// the cursor is drained (or one row exists, when `first_only`).
    fn fetch(&mut self, first_only: bool) -> DbalResult<()> {
        if self.columns.is_none() {
            let columns: Vec<String> = (0..self.cursor.field_count())
                .map(|i| self.cursor.column_meta(i).name.clone())
                .collect();
            self.columns = Some(columns.into());
            self.types = Some(TypeMap::build(self.dialect.as_ref(), self.cursor.as_ref()));
        }
        let columns = self.columns.as_ref().expect("header built").clone();
        let types = self.types.as_ref().expect("header built").clone();

        while !self.done && !(first_only && !self.fetched.is_empty()) {
            match self.cursor.next_row()? {
                Some(mut values) => {
                    types.convert_row(&columns, &mut values)?;
                    self.fetched.push(Row::new(columns.clone(), values));
                }
                None => self.done = true,
            }
        }
        Ok(())
    }

    /// Fetch all rows.
    pub fn all(&mut self) -> DbalResult<Vec<Row>> {
        self.fetch(false)?;
        Ok(self.fetched.clone())
    }

    /// Alias of [`ResultSet::all`].
    pub fn get(&mut self) -> DbalResult<Vec<Row>> {
        self.all()
    }

    /// Alias of [`ResultSet::all`]; rows expose named and positional access
    /// over the same converted values. See [`ResultSet::pluck`] and
    /// [`ResultSet::pluck_map`] for single- and two-column projections.
    pub fn get_array(&mut self) -> DbalResult<Vec<Row>> {
        self.all()
    }

    /// Alias of [`ResultSet::get_array`].
    pub fn get_assoc(&mut self) -> DbalResult<Vec<Row>> {
        self.all()
    }

    /// Fetch the first row, if any.
    pub fn first(&mut self) -> DbalResult<Option<Row>> {
        self.fetch(true)?;
        Ok(self.fetched.first().cloned())
    }

    /// Alias of [`ResultSet::first`]; rows expose named and positional
    /// access over the same converted values.
    pub fn first_array(&mut self) -> DbalResult<Option<Row>> {
        self.first()
    }

    /// Alias of [`ResultSet::first_array`].
    pub fn first_assoc(&mut self) -> DbalResult<Option<Row>> {
        self.first()
    }

    /// Project one column across all rows. Rows without the column yield
    /// `Null`.
    pub fn pluck(&mut self, column: &str) -> DbalResult<Vec<Value>> {
        self.fetch(false)?;
        Ok(self
            .fetched
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    /// Project two columns across all rows as `(key, value)` pairs.
    pub fn pluck_map(&mut self, value: &str, key: &str) -> DbalResult<Vec<(Value, Value)>> {
        self.fetch(false)?;
        Ok(self
            .fetched
            .iter()
            .map(|row| {
                (
                    row.get(key).cloned().unwrap_or(Value::Null),
                    row.get(value).cloned().unwrap_or(Value::Null),
                )
            })
            .collect())
    }

    /// The first column of the first row, if any.
    pub fn value(&mut self) -> DbalResult<Option<Value>> {
        self.fetch(true)?;
        Ok(self
            .fetched
            .first()
            .and_then(|row| row.get_index(0))
            .cloned())
    }

    /// A named column of the first row, if any.
    pub fn value_of(&mut self, column: &str) -> DbalResult<Option<Value>> {
        self.fetch(true)?;
        Ok(self.fetched.first().and_then(|row| row.get(column)).cloned())
    }
}

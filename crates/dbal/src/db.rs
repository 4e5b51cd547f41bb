//! The database handle: fluent query building plus record access.
//!
//! A [`Db`] pairs an injected [`Dialect`] with a [`Connector`] and carries
//! the clause state of one pending query. `execute()` renders that state,
//! swaps in a fresh builder before dispatching, and returns a brand-new
//! [`ResultSet`] owning its own cursor, so the handle is immediately
//! reusable for the next query and no state leaks between statements.

use crate::builder::QueryBuilder;
use crate::config::ConnectionConfig;
use crate::connection::Connector;
use crate::dialect::Dialect;
use crate::error::{DbalError, DbalResult};
use crate::monitor::{NoopMonitor, QueryContext, QueryMonitor, QueryResult};
use crate::result::{ResultSet, Row};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An ordered set of named fields, used as the input shape for
/// [`Db::insert`] and [`Db::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any prior value for the same column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    /// Get a field value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Row> for Record {
    fn from(row: Row) -> Self {
        let mut record = Record::new();
        for (column, value) in row.columns().iter().zip(row.values()) {
            record = record.set(column.clone(), value.clone());
        }
        record
    }
}

/// Outcome of a diff-based [`Db::update`].
#[derive(Debug)]
pub enum UpdateOutcome {
    /// No field differed from the stored original; no write was issued.
    Unchanged,
    /// A write was issued; carries the live result handle.
    Updated(ResultSet),
}

impl UpdateOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, UpdateOutcome::Unchanged)
    }
}

/// Conversion of the accepted primary-key argument shapes (one scalar, a
/// sequence, or an array) into a value list for [`Db::find`] and
/// [`Db::delete`].
pub trait IntoValues {
    fn into_values(self) -> Vec<Value>;
}

macro_rules! impl_into_values_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoValues for $t {
                fn into_values(self) -> Vec<Value> {
                    vec![self.into()]
                }
            }
        )*
    };
}

impl_into_values_scalar!(bool, i16, i32, i64, u32, f32, f64, &str, String, Value);

impl<T: Into<Value>> IntoValues for Vec<T> {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

/// A database handle for one backend.
pub struct Db {
    dialect: Arc<dyn Dialect>,
    connector: Box<dyn Connector>,
    monitor: Arc<dyn QueryMonitor>,
    builder: QueryBuilder,
    configs: HashMap<String, ConnectionConfig>,
    connection_name: Option<String>,
    slow_threshold: Option<Duration>,
}

impl Db {
    /// Create a handle from an injected dialect and connector.
    pub fn new(dialect: Arc<dyn Dialect>, connector: Box<dyn Connector>) -> Self {
        Self {
            dialect,
            connector,
            monitor: Arc::new(NoopMonitor),
            builder: QueryBuilder::default(),
            configs: HashMap::new(),
            connection_name: None,
            slow_threshold: None,
        }
    }

    /// Attach a map of named connection configurations.
    pub fn with_configs(mut self, configs: HashMap<String, ConnectionConfig>) -> Self {
        self.configs = configs;
        self
    }

    /// Attach a query monitor.
    pub fn with_monitor(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Report queries at or above `threshold` to the monitor's slow-query
    /// hook.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    /// Select the active named connection configuration.
    pub fn connection(&mut self, name: &str) -> &mut Self {
        self.connection_name = Some(name.to_string());
        self
    }

    /// The active named connection, if one was selected.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection_name.as_deref()
    }

    /// The active connection configuration, if one is selected and known.
    pub fn connection_config(&self) -> Option<&ConnectionConfig> {
        self.configs.get(self.connection_name.as_deref()?)
    }

    /// The dialect this handle generates SQL for.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    // ==================== Fluent builder facade ====================

    /// Replace the select list.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder.select(columns);
        self
    }

    /// Append one column to the select list.
    pub fn add_select(&mut self, column: impl Into<String>) -> &mut Self {
        self.builder.add_select(column);
        self
    }

    /// Switch into count mode.
    pub fn select_count(&mut self, expr: impl Into<String>) -> &mut Self {
        self.builder.select_count(expr);
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.builder.distinct(distinct);
        self
    }

    /// Set the FROM source, signalling the start of a new query. No
    /// connection survives between executes, so there is no handle to
    /// discard here.
    pub fn from(&mut self, source: impl Into<String>) -> &mut Self {
        self.builder.from(source);
        self
    }

    /// Alias of [`Db::from`].
    pub fn table(&mut self, source: impl Into<String>) -> &mut Self {
        self.from(source)
    }

    /// Set the primary key column, or a comma-joined list for a composite
    /// key. Used only by find/update/delete.
    pub fn key(&mut self, spec: impl Into<String>) -> &mut Self {
        self.builder.key(spec);
        self
    }

    /// Add a raw WHERE fragment, used verbatim; escaping responsibility
    /// shifts to the caller.
    pub fn where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.builder.where_raw(sql);
        self
    }

    /// Add a `column = value` condition.
    pub fn where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.builder.where_eq(column, value);
        self
    }

    /// Add a `column <op> value` condition. Unrecognized operators degrade
    /// to `=`.
    pub fn where_cmp(
        &mut self,
        column: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.builder.where_cmp(column, op, value);
        self
    }

    /// Add a raw WHERE fragment joined with `or`.
    pub fn or_where_raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.builder.or_where_raw(sql);
        self
    }

    /// Add a `column = value` condition joined with `or`.
    pub fn or_where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.builder.or_where_eq(column, value);
        self
    }

    /// Add a `column <op> value` condition joined with `or`.
    pub fn or_where_cmp(
        &mut self,
        column: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.builder.or_where_cmp(column, op, value);
        self
    }

    /// Set the GROUP BY clause; the empty string unsets it.
    pub fn group_by(&mut self, sql: impl Into<String>) -> &mut Self {
        self.builder.group_by(sql);
        self
    }

    /// Set the HAVING clause; the empty string unsets it.
    pub fn having(&mut self, sql: impl Into<String>) -> &mut Self {
        self.builder.having(sql);
        self
    }

    /// Set the ORDER BY clause; the empty string unsets it.
    pub fn order_by(&mut self, sql: impl Into<String>) -> &mut Self {
        self.builder.order_by(sql);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.builder.limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.builder.offset(offset);
        self
    }

    /// Set the 1-based page; when set, page wins over offset.
    pub fn page(&mut self, page: u64) -> &mut Self {
        self.builder.page(page);
        self
    }

    /// Render the pending query without executing or resetting anything.
    pub fn to_sql(&self) -> DbalResult<String> {
        self.builder.to_sql(self.dialect.as_ref())
    }

    // ==================== Execution ====================

    /// Render and execute the pending query. The builder is reset to
    /// defaults before dispatch.
    pub fn execute(&mut self) -> DbalResult<ResultSet> {
        let sql = self.builder.to_sql(self.dialect.as_ref())?;
        self.dispatch(&sql)
    }

    /// Execute a caller-supplied SQL string. The builder is reset to
    /// defaults before dispatch, same as [`Db::execute`].
    pub fn execute_sql(&mut self, sql: &str) -> DbalResult<ResultSet> {
        self.dispatch(sql)
    }

    /// Alias of [`Db::execute`].
    pub fn query(&mut self) -> DbalResult<ResultSet> {
        self.execute()
    }

    /// Alias of [`Db::execute`].
    pub fn all(&mut self) -> DbalResult<ResultSet> {
        self.execute()
    }

    fn dispatch(&mut self, sql: &str) -> DbalResult<ResultSet> {
        self.builder = QueryBuilder::default();

        let ctx = QueryContext::new(sql, self.connection_name.clone());
        self.monitor.on_query_start(&ctx);
        let started = Instant::now();
        let outcome = self.run_statement(sql);
        let elapsed = started.elapsed();
        match &outcome {
            Ok(rs) => {
                self.monitor
                    .on_query_complete(&ctx, elapsed, &QueryResult::Rows(rs.count()));
            }
            Err(err) => {
                self.monitor
                    .on_query_complete(&ctx, elapsed, &QueryResult::Error(err.to_string()));
            }
        }
        if let Some(threshold) = self.slow_threshold {
            if elapsed >= threshold {
                self.monitor.on_slow_query(&ctx, elapsed);
            }
        }
        outcome
    }

    fn run_statement(&self, sql: &str) -> DbalResult<ResultSet> {
        // A fresh connection for every statement; the cursor owns the
        // handle afterwards and tears it down on drop.
        let mut conn = self.connector.open(self.connection_config())?;
        for stmt in self.dialect.session_setup() {
            conn.run(stmt)?;
        }
        let cursor = conn.execute(sql)?;
        Ok(ResultSet::new(cursor, Arc::clone(&self.dialect)))
    }

    // ==================== Record access ====================

    /// Return one row by one or more primary-key values.
    ///
    /// There must be exactly as many id values as key columns; a mismatch
    /// is a [`DbalError::KeyCardinality`] error. Any ORDER BY is cleared
    /// (ordering is meaningless for a single-row lookup).
    pub fn find(&mut self, ids: impl IntoValues) -> DbalResult<Option<Row>> {
        let ids = ids.into_values();
        let keys = self.builder.key_columns();
        if ids.len() != keys.len() {
            return Err(DbalError::KeyCardinality {
                expected: keys.len(),
                supplied: ids.len(),
            });
        }
        for (key, id) in keys.iter().zip(ids) {
            self.builder.where_eq(key.as_str(), trim_value(id));
        }
        self.builder.order_by("");
        let mut result = self.execute()?;
        result.first()
    }

    /// Alias of [`Db::find`]; rows expose named and positional access over
    /// the same converted values.
    pub fn find_array(&mut self, ids: impl IntoValues) -> DbalResult<Option<Row>> {
        self.find(ids)
    }

    /// Insert a record, emitting the dialect's generated-identity suffix.
    pub fn insert(&mut self, record: &Record) -> DbalResult<ResultSet> {
        if record.is_empty() {
            return Err(DbalError::EmptyRecord);
        }
        let source = self.source()?;
        let columns: Vec<&str> = record.iter().map(|(c, _)| c).collect();
        let values: Vec<String> = record.iter().map(|(_, v)| self.dialect.quote(v)).collect();
        let sql = format!(
            "INSERT INTO {source} ({}) VALUES ({}){}",
            columns.join(", "),
            values.join(", "),
            self.dialect.identity_suffix()
        );
        self.execute_sql(&sql)
    }

    /// Update one record by its primary key(s), writing only the fields
    /// that differ from the stored original.
    ///
    /// The record must carry its own key fields. The original row is looked
    /// up first and compared field-by-field; if nothing differs, no write
    /// statement is issued and [`UpdateOutcome::Unchanged`] is returned.
    /// The WHERE clause always pins on the original key values, never on a
    /// possibly-mutated key field.
    pub fn update(&mut self, record: &Record) -> DbalResult<UpdateOutcome> {
        let source = self.source()?;
        let keys = self.builder.key_columns();
        let key_spec = keys.join(",");

        let mut pk = Vec::with_capacity(keys.len());
        for key in &keys {
            let value = record
                .get(key)
                .cloned()
                .ok_or_else(|| DbalError::MissingKey(key.clone()))?;
            pk.push(value);
        }

        let original = self
            .table(source.as_str())
            .key(key_spec.as_str())
            .find(pk.clone())?
            .ok_or_else(|| {
                DbalError::not_found(format!("no {source} row matches the primary key"))
            })?;

        let mut assignments = Vec::new();
        for (column, value) in record.iter() {
            let previous = original.get(column).unwrap_or(&Value::Null);
            if !value.loosely_eq(previous) {
                assignments.push(format!("{column} = {}", self.dialect.quote(value)));
            }
        }
        if assignments.is_empty() {
            return Ok(UpdateOutcome::Unchanged);
        }

        let sql = format!(
            "UPDATE {source} SET {} WHERE {}",
            assignments.join(", "),
            self.key_predicate(&keys, &pk)
        );
        Ok(UpdateOutcome::Updated(self.execute_sql(&sql)?))
    }

    /// Delete one record by one or more primary-key values. Same
    /// cardinality contract as [`Db::find`].
    pub fn delete(&mut self, ids: impl IntoValues) -> DbalResult<ResultSet> {
        let ids = ids.into_values();
        let source = self.source()?;
        let keys = self.builder.key_columns();
        if ids.len() != keys.len() {
            return Err(DbalError::KeyCardinality {
                expected: keys.len(),
                supplied: ids.len(),
            });
        }
        let sql = format!(
            "DELETE FROM {source} WHERE {}",
            self.key_predicate(&keys, &ids)
        );
        self.execute_sql(&sql)
    }

    /// Execute a stored procedure with inline-quoted arguments, rendered
    /// per dialect.
    pub fn procedure(&mut self, name: &str, params: &[(&str, Value)]) -> DbalResult<ResultSet> {
        let sql = self.dialect.procedure_call(name, params);
        self.execute_sql(&sql)
    }

    fn source(&self) -> DbalResult<String> {
        self.builder
            .source()
            .map(str::to_string)
            .ok_or(DbalError::MissingSource)
    }

    /// Render the `k1 = 'v1' AND k2 = 'v2'` key predicate used by update
    /// and delete; each value is trimmed, escaped and always quoted.
    fn key_predicate(&self, keys: &[String], values: &[Value]) -> String {
        keys.iter()
            .zip(values)
            .map(|(key, value)| {
                format!(
                    "{key} = '{}'",
                    self.dialect.escape(value.to_text().trim())
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn trim_value(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(s.trim().to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ColumnMeta;
    use crate::dialect::{Mssql, Mysql};
    use crate::testing::{TestConnector, TestResult};

    fn mssql_db(connector: &TestConnector) -> Db {
        Db::new(Arc::new(Mssql::new()), Box::new(connector.clone()))
    }

    fn user_row(id: i64, name: &str, active: i64) -> TestResult {
        TestResult::new(
            vec![
                ColumnMeta::new("id", "int", 4),
                ColumnMeta::new("name", "varchar", 50),
                ColumnMeta::new("active", "bit", 1),
            ],
            vec![vec![
                Value::Int(id),
                Value::Text(name.into()),
                Value::Int(active),
            ]],
        )
    }

    #[test]
    fn test_execute_resets_builder_for_reuse() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users").where_eq("id", 1).order_by("name");
        db.execute().unwrap();
        // The handle is immediately reusable; no state from the first
        // query survives.
        db.table("orders");
        assert_eq!(db.to_sql().unwrap(), "SELECT * FROM orders");
    }

    #[test]
    fn test_execute_opens_one_connection_per_statement() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users").execute().unwrap();
        db.table("users").execute().unwrap();
        assert_eq!(connector.open_count(), 2);
    }

    #[test]
    fn test_session_setup_runs_before_each_statement() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users").execute().unwrap();
        assert_eq!(
            connector.setup_statements(),
            vec!["SET ANSI_NULLS ON", "SET ANSI_WARNINGS ON"]
        );
        let connector = TestConnector::new();
        let mut db = Db::new(Arc::new(Mysql::new()), Box::new(connector.clone()));
        db.table("users").execute().unwrap();
        assert!(connector.setup_statements().is_empty());
    }

    #[test]
    fn test_find_cardinality_mismatch() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let err = db
            .table("order_lines")
            .key("order_id, line_no")
            .find(5)
            .unwrap_err();
        assert!(err.is_key_cardinality());
        assert!(connector.executed().is_empty());
    }

    #[test]
    fn test_find_composite_key_clears_order_by() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let row = db
            .table("order_lines")
            .key("order_id, line_no")
            .order_by("line_no DESC")
            .find([Value::Int(5), Value::Text(" 2 ".into())])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("name"), Some(&Value::Text("alice".into())));
        let executed = connector.executed();
        assert_eq!(
            executed,
            vec!["SELECT * FROM order_lines WHERE order_id = 5 and line_no = 2"]
        );
    }

    #[test]
    fn test_find_single_key() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let row = db.table("users").find(5).unwrap().unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(5)));
        assert_eq!(
            connector.executed(),
            vec!["SELECT * FROM users WHERE id = 5"]
        );
    }

    #[test]
    fn test_find_array_matches_find() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let row = db.table("users").find_array(5).unwrap().unwrap();
        assert_eq!(row.get("name"), row.get_index(1));
        assert_eq!(row.get("id"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_find_missing_row_is_none() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        assert!(db.table("users").find(99).unwrap().is_none());
    }

    #[test]
    fn test_insert_renders_record_and_identity_suffix() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let record = Record::new()
            .set("name", "O'Brien")
            .set("age", 41)
            .set("note", Value::Null)
            .set("created", "\\GETDATE()");
        db.table("users").insert(&record).unwrap();
        assert_eq!(
            connector.executed(),
            vec![
                "INSERT INTO users (name, age, note, created) VALUES ('O''Brien', 41, null, GETDATE()) SELECT @@IDENTITY"
            ]
        );
    }

    #[test]
    fn test_insert_empty_record_rejected() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        assert!(matches!(
            db.table("users").insert(&Record::new()),
            Err(DbalError::EmptyRecord)
        ));
    }

    #[test]
    fn test_insert_requires_source() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let record = Record::new().set("name", "x");
        assert!(matches!(
            db.insert(&record),
            Err(DbalError::MissingSource)
        ));
    }

    #[test]
    fn test_update_skips_write_when_nothing_changed() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let record = Record::new()
            .set("id", 5)
            .set("name", "alice")
            .set("active", true);
        let outcome = db.table("users").update(&record).unwrap();
        assert!(outcome.is_unchanged());
        // Only the lookup hit the driver.
        assert_eq!(
            connector.executed(),
            vec!["SELECT * FROM users WHERE id = 5"]
        );
    }

    #[test]
    fn test_update_writes_only_changed_fields() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let record = Record::new()
            .set("id", 5)
            .set("name", "alicia")
            .set("active", true);
        let outcome = db.table("users").update(&record).unwrap();
        assert!(!outcome.is_unchanged());
        let executed = connector.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(
            executed[1],
            "UPDATE users SET name = 'alicia' WHERE id = '5'"
        );
    }

    #[test]
    fn test_update_pins_where_on_original_key() {
        let connector = TestConnector::new();
        connector.push_result(TestResult::new(
            vec![
                ColumnMeta::new("order_id", "int", 4),
                ColumnMeta::new("line_no", "int", 4),
                ColumnMeta::new("qty", "int", 4),
            ],
            vec![vec![Value::Int(5), Value::Int(2), Value::Int(1)]],
        ));
        let mut db = mssql_db(&connector);
        let record = Record::new()
            .set("order_id", 5)
            .set("line_no", 2)
            .set("qty", 3);
        db.table("order_lines")
            .key("order_id, line_no")
            .update(&record)
            .unwrap();
        let executed = connector.executed();
        assert_eq!(
            executed[1],
            "UPDATE order_lines SET qty = 3 WHERE order_id = '5' AND line_no = '2'"
        );
    }

    #[test]
    fn test_update_requires_key_fields() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let record = Record::new().set("name", "alicia");
        assert!(matches!(
            db.table("users").update(&record),
            Err(DbalError::MissingKey(_))
        ));
    }

    #[test]
    fn test_update_missing_original_is_not_found() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let record = Record::new().set("id", 9).set("name", "ghost");
        let err = db.table("users").update(&record).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_renders_quoted_trimmed_keys() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("order_lines")
            .key("order_id, line_no")
            .delete([Value::Int(5), Value::Text(" 2 ".into())])
            .unwrap();
        assert_eq!(
            connector.executed(),
            vec!["DELETE FROM order_lines WHERE order_id = '5' AND line_no = '2'"]
        );
    }

    #[test]
    fn test_delete_cardinality_mismatch() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        let err = db
            .table("order_lines")
            .key("order_id, line_no")
            .delete(vec![5i64])
            .unwrap_err();
        assert!(err.is_key_cardinality());
    }

    #[test]
    fn test_delete_escapes_key_values() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users").delete("O'Brien").unwrap();
        assert_eq!(
            connector.executed(),
            vec!["DELETE FROM users WHERE id = 'O''Brien'"]
        );
    }

    #[test]
    fn test_procedure_dispatch() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.procedure("sp_audit", &[("user", Value::Text("bob".into()))])
            .unwrap();
        assert_eq!(connector.executed(), vec!["EXEC sp_audit @user = 'bob'"]);
    }

    #[test]
    fn test_execute_sql_resets_builder_too() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users").where_eq("id", 1);
        db.execute_sql("SELECT 1").unwrap();
        db.table("orders");
        assert_eq!(db.to_sql().unwrap(), "SELECT * FROM orders");
    }

    #[test]
    fn test_connection_selection() {
        let connector = TestConnector::new();
        let configs = crate::config::parse_connection_map(
            r#"{"reports": {"host":"db1","database":"reports","username":"svc","password":"x"}}"#,
        )
        .unwrap();
        let mut db = mssql_db(&connector).with_configs(configs);
        assert!(db.connection_name().is_none());
        db.connection("reports");
        assert_eq!(db.connection_name(), Some("reports"));
        assert_eq!(db.connection_config().unwrap().database, "reports");
        db.connection("unknown");
        assert!(db.connection_config().is_none());
    }

    #[test]
    fn test_fluent_chain_to_sql() {
        let connector = TestConnector::new();
        let mut db = mssql_db(&connector);
        db.table("users")
            .select(["id", "name"])
            .where_eq("status", "active")
            .or_where_cmp("age", ">", 65)
            .order_by("name")
            .limit(10);
        assert_eq!(
            db.to_sql().unwrap(),
            "SELECT id, name FROM users WHERE status = 'active' or age > 65 ORDER BY name OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_record_from_row_round_trip() {
        let connector = TestConnector::new();
        connector.push_result(user_row(5, "alice", 1));
        let mut db = mssql_db(&connector);
        let row = db.table("users").find(5).unwrap().unwrap();
        let record = Record::from(row);
        assert_eq!(record.get("name"), Some(&Value::Text("alice".into())));
        assert_eq!(record.len(), 3);
    }
}

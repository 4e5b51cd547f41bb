//! Query monitoring hooks for SQL execution.
//!
//! [`crate::Db`] wraps every dispatched statement in a [`QueryMonitor`],
//! giving callers a seam for timing, logging and metrics without the core
//! ever writing to an output stream itself. The default is [`NoopMonitor`];
//! with the `tracing` feature, [`LoggingMonitor`] emits one `debug!` event
//! per statement.

use std::fmt;
use std::time::Duration;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g. EXEC, SET, DDL)
    Other,
}

impl QueryType {
    /// Detect query type from SQL string.
    pub fn from_sql(sql: &str) -> Self {
        fn strip_sql_prefix(sql: &str) -> &str {
            let mut s = sql;
            loop {
                let before = s;
                s = s.trim_start();
                if s.starts_with("--") {
                    if let Some(pos) = s.find('\n') {
                        s = &s[pos + 1..];
                        continue;
                    }
                    return "";
                }
                if s.starts_with("/*") {
                    if let Some(pos) = s.find("*/") {
                        s = &s[pos + 2..];
                        continue;
                    }
                    return "";
                }
                if s.starts_with('(') {
                    s = &s[1..];
                    continue;
                }
                if s == before {
                    break;
                }
            }
            s
        }

        fn starts_with_keyword(s: &str, keyword: &str) -> bool {
            match s.get(0..keyword.len()) {
                Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
                None => false,
            }
        }

        let trimmed = strip_sql_prefix(sql);
        if starts_with_keyword(trimmed, "SELECT") || starts_with_keyword(trimmed, "WITH") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// Context information about the query being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL statement as dispatched.
    pub sql: String,
    /// Detected query type.
    pub query_type: QueryType,
    /// Active named connection, if one was selected.
    pub connection: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str, connection: Option<String>) -> Self {
        Self {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            connection,
        }
    }
}

/// Result of a query execution for monitoring purposes.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// Query returned rows.
    Rows(usize),
    /// Query failed with an error.
    Error(String),
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for monitoring SQL query execution.
pub trait QueryMonitor: Send + Sync {
    /// Called before a query is executed.
    ///
    /// Default implementation does nothing.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after a query completes (success or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a query exceeds the configured slow threshold.
    ///
    /// Default implementation does nothing.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}

/// A no-op monitor that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl QueryMonitor for NoopMonitor {
    fn on_query_complete(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

/// A monitor that emits `tracing` events for every statement.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMonitor;

#[cfg(feature = "tracing")]
impl QueryMonitor for LoggingMonitor {
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        tracing::debug!(
            sql = %ctx.sql,
            connection = ctx.connection.as_deref().unwrap_or("default"),
            elapsed_ms = duration.as_millis() as u64,
            result = %result,
            "query complete"
        );
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        tracing::warn!(
            sql = %ctx.sql,
            elapsed_ms = duration.as_millis() as u64,
            "slow query"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_detection() {
        assert_eq!(QueryType::from_sql("SELECT * FROM t"), QueryType::Select);
        assert_eq!(QueryType::from_sql("  select 1"), QueryType::Select);
        assert_eq!(QueryType::from_sql("WITH x AS (SELECT 1) SELECT * FROM x"), QueryType::Select);
        assert_eq!(QueryType::from_sql("INSERT INTO t (a) VALUES (1)"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("UPDATE t SET a = 1"), QueryType::Update);
        assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Delete);
        assert_eq!(QueryType::from_sql("EXEC sp_who"), QueryType::Other);
    }

    #[test]
    fn test_query_type_skips_comments() {
        assert_eq!(
            QueryType::from_sql("-- leading comment\nSELECT 1"),
            QueryType::Select
        );
        assert_eq!(
            QueryType::from_sql("/* block */ UPDATE t SET a = 1"),
            QueryType::Update
        );
        assert_eq!(QueryType::from_sql("(SELECT 1)"), QueryType::Select);
    }

    #[test]
    fn test_query_result_display() {
        assert_eq!(QueryResult::Rows(3).to_string(), "3 rows");
        assert_eq!(QueryResult::Error("boom".into()).to_string(), "error: boom");
    }
}

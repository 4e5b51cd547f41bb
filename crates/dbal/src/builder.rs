//! Query builder state and SQL rendering.

use crate::dialect::Dialect;
use crate::error::{DbalError, DbalResult};
use crate::expr::Cond;
use crate::value::Value;

/// Accumulated clause state for one pending SELECT query.
///
/// Setters mutate in place and are exposed fluently through [`crate::Db`].
/// Rendering via [`QueryBuilder::to_sql`] is pure: calling it twice without
/// intervening mutation yields identical output.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    select: Vec<String>,
    select_count: Option<String>,
    distinct: bool,
    from: Option<String>,
    predicate: Option<Cond>,
    group_by: Option<String>,
    having: Option<String>,
    order_by: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    page: Option<u64>,
    key: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            select: vec!["*".to_string()],
            select_count: None,
            distinct: false,
            from: None,
            predicate: None,
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
            offset: None,
            page: None,
            key: "id".to_string(),
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the select list.
    pub fn select<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        if self.select.is_empty() {
            self.select.push("*".to_string());
        }
    }

    /// Append one column to the select list.
    pub fn add_select(&mut self, column: impl Into<String>) {
        self.select.push(column.into());
    }

    /// Switch into count mode. Count queries never render
    /// DISTINCT-on-columns, ORDER BY or paging; `distinct` folds into
    /// `count(DISTINCT expr)` instead.
    pub fn select_count(&mut self, expr: impl Into<String>) {
        self.select_count = Some(expr.into());
    }

    pub fn distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    /// Set the FROM source.
    pub fn from(&mut self, source: impl Into<String>) {
        self.from = Some(source.into());
    }

    /// The current FROM source, if set.
    pub fn source(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Set the primary key column name, or a comma-joined list for a
    /// composite key. Used only by find/update/delete.
    pub fn key(&mut self, spec: impl Into<String>) {
        self.key = spec.into();
    }

    /// The primary key column names, split on commas.
    pub fn key_columns(&self) -> Vec<String> {
        self.key
            .split(',')
            .map(|k| k.trim().to_string())
            .collect()
    }

    /// Add a raw WHERE fragment, used verbatim. Escaping responsibility
    /// shifts to the caller.
    pub fn where_raw(&mut self, sql: impl Into<String>) {
        self.push_cond(Cond::raw(sql), false);
    }

    /// Add a `column = value` condition.
    pub fn where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.push_cond(Cond::eq(column, value), false);
    }

    /// Add a `column <op> value` condition. Unrecognized operators degrade
    /// to `=`.
    pub fn where_cmp(&mut self, column: impl Into<String>, op: &str, value: impl Into<Value>) {
        self.push_cond(Cond::compare(column, op, value), false);
    }

    /// Add a raw WHERE fragment joined with `or`.
    pub fn or_where_raw(&mut self, sql: impl Into<String>) {
        self.push_cond(Cond::raw(sql), true);
    }

    /// Add a `column = value` condition joined with `or`.
    pub fn or_where_eq(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.push_cond(Cond::eq(column, value), true);
    }

    /// Add a `column <op> value` condition joined with `or`.
    pub fn or_where_cmp(&mut self, column: impl Into<String>, op: &str, value: impl Into<Value>) {
        self.push_cond(Cond::compare(column, op, value), true);
    }

    fn push_cond(&mut self, cond: Cond, or: bool) {
        self.predicate = Some(Cond::chain(self.predicate.take(), cond, or));
    }

    /// Set the GROUP BY clause. The empty string unsets it.
    pub fn group_by(&mut self, sql: impl Into<String>) {
        self.group_by = non_empty(sql.into());
    }

    /// Set the HAVING clause. The empty string unsets it.
    pub fn having(&mut self, sql: impl Into<String>) {
        self.having = non_empty(sql.into());
    }

    /// Set the ORDER BY clause. The empty string unsets it.
    pub fn order_by(&mut self, sql: impl Into<String>) {
        self.order_by = non_empty(sql.into());
    }

    pub fn limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    pub fn offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    /// Set the 1-based page. When set, page wins over offset.
    pub fn page(&mut self, page: u64) {
        self.page = Some(page);
    }

    /// Render the accumulated state to one SQL string.
    ///
    /// Clause order: `SELECT [DISTINCT] <cols-or-count> FROM <source>
    /// [WHERE ..] [GROUP BY ..] [HAVING ..] [ORDER BY ..] [paging]`.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> DbalResult<String> {
        let from = self.from.as_deref().ok_or(DbalError::MissingSource)?;

        let mut sql = String::from("SELECT ");
        if self.distinct && self.select_count.is_none() {
            sql.push_str("DISTINCT ");
        }

        match &self.select_count {
            Some(expr) => {
                if self.distinct {
                    sql.push_str(&format!("count(DISTINCT {expr})"));
                } else {
                    sql.push_str(&format!("count({expr})"));
                }
            }
            None => sql.push_str(&self.select.join(", ")),
        }

        sql.push_str(" FROM ");
        sql.push_str(from);

        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.render(dialect));
        }

        if let Some(group_by) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }
        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(having);
        }

        // A count query never orders or paginates.
        if self.select_count.is_none() {
            if let Some(order_by) = &self.order_by {
                sql.push_str(" ORDER BY ");
                sql.push_str(order_by);
            }
            let paging = dialect.limit_offset(self.limit, self.offset, self.page);
            if !paging.is_empty() {
                sql.push(' ');
                sql.push_str(&paging);
            }
        }

        Ok(sql)
    }
}

fn non_empty(sql: String) -> Option<String> {
    if sql.is_empty() { None } else { Some(sql) }
}

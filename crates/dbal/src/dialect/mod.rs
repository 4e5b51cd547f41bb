//! Per-backend SQL rules.
//!
//! A [`Dialect`] bundles everything that differs between backends: value
//! escaping, the paging clause, native-type classification for the result
//! typer, session setup, and the generated-identity suffix. The concrete
//! dialect is injected into [`crate::Db`]; one builder implementation is
//! shared across backends.

mod mssql;
mod mysql;

pub use mssql::Mssql;
pub use mysql::Mysql;

use crate::connection::ColumnMeta;
use crate::value::{Value, is_numeric, to_hex};

/// Semantic classification of a result column, derived from driver metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    /// 16-byte binary GUID; decoded to canonical hex form.
    Guid,
    /// Date/time; re-rendered as `YYYY-MM-DD HH:MM:SS`.
    DateTime,
    /// Integral; cast to `Value::Int`.
    Int,
    /// Floating point or money; cast to `Value::Float`.
    Float,
    /// Passed through untouched.
    Plain,
}

/// Backend-specific SQL generation rules.
pub trait Dialect: Send + Sync {
    /// Human-readable dialect name, used in logs.
    fn name(&self) -> &'static str;

    /// Escape a raw string for inline inclusion in a single-quoted literal.
    ///
    /// Numeric input passes through untouched; empty input yields the empty
    /// string. Everything else is filtered and quote-doubled per backend.
    fn escape(&self, raw: &str) -> String;

    /// Render the paging clause, or an empty string when limit, offset and
    /// page are all unset.
    ///
    /// `limit` defaults to 25 once any paging field is set; a 1-based `page`
    /// overrides `offset` as `(page - 1) * limit`, else offset defaults 0.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, page: Option<u64>) -> String;

    /// Classify a result column from its driver metadata.
    fn classify(&self, meta: &ColumnMeta) -> ColumnClass;

    /// Statements to run on a fresh connection before the query.
    fn session_setup(&self) -> &'static [&'static str] {
        &[]
    }

    /// Suffix appended to an INSERT to report the generated identity.
    fn identity_suffix(&self) -> &'static str;

    /// Render a stored-procedure invocation with inline-quoted arguments.
    fn procedure_call(&self, name: &str, params: &[(&str, Value)]) -> String;

    /// Quote a value for inline inclusion in SQL.
    ///
    /// Shared policy across backends:
    /// - `Null` renders as the literal `null`
    /// - booleans render as `1`/`0`
    /// - numbers (and numeric strings) render unquoted and are never routed
    ///   through [`Dialect::escape`], which protects `0` from any lossy
    ///   escape path
    /// - a leading `\` marks the remainder as a raw SQL fragment emitted
    ///   verbatim (e.g. `\NOW()`)
    /// - any other string is escaped and single-quoted
    /// - bytes render as a `0x...` hex literal
    fn quote(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => {
                if let Some(raw) = s.strip_prefix('\\') {
                    raw.to_string()
                } else if is_numeric(s) {
                    s.clone()
                } else {
                    format!("'{}'", self.escape(s))
                }
            }
            Value::Bytes(b) => format!("0x{}", to_hex(b)),
        }
    }
}

/// Resolve effective (limit, offset) from the three paging fields, or `None`
/// when paging is entirely unset.
pub(crate) fn resolve_paging(
    limit: Option<u64>,
    offset: Option<u64>,
    page: Option<u64>,
) -> Option<(u64, u64)> {
    if limit.is_none() && offset.is_none() && page.is_none() {
        return None;
    }
    let limit = limit.unwrap_or(25);
    let offset = match page {
        Some(p) => p.saturating_sub(1) * limit,
        None => offset.unwrap_or(0),
    };
    Some((limit, offset))
}

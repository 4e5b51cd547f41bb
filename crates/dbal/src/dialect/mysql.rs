//! MySQL dialect.

use crate::connection::ColumnMeta;
use crate::dialect::{ColumnClass, Dialect, resolve_paging};
use crate::value::{Value, is_numeric};

/// MySQL rules: client-library style backslash escaping, the classic
/// `LIMIT l, o` paging clause, and a minimal typing pipeline (the driver
/// already returns typed numerics, so only date/time columns are
/// re-rendered).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Mysql {
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for Mysql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn escape(&self, raw: &str) -> String {
        if is_numeric(raw) {
            return raw.to_string();
        }
        if raw.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(raw.len() + 4);
        for c in raw.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\u{1a}' => out.push_str("\\Z"),
                _ => out.push(c),
            }
        }
        out
    }

    /// Argument order is limit-then-offset in this clause. That asymmetry is
    /// inherited behavior and must not be "fixed" to offset-then-limit.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, page: Option<u64>) -> String {
        match resolve_paging(limit, offset, page) {
            Some((limit, offset)) => format!("LIMIT {limit}, {offset}"),
            None => String::new(),
        }
    }

    fn classify(&self, meta: &ColumnMeta) -> ColumnClass {
        // Numerics arrive typed from the driver; only wall-clock columns
        // need their rendering normalized.
        match meta.native_type.to_ascii_lowercase().as_str() {
            "datetime" | "timestamp" => ColumnClass::DateTime,
            _ => ColumnClass::Plain,
        }
    }

    fn identity_suffix(&self) -> &'static str {
        "; SELECT LAST_INSERT_ID()"
    }

    fn procedure_call(&self, name: &str, params: &[(&str, Value)]) -> String {
        let args: Vec<String> = params.iter().map(|(_, v)| self.quote(v)).collect();
        format!("CALL {name}({})", args.join(", "))
    }
}

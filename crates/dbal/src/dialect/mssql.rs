//! SQL Server dialect.

use crate::connection::ColumnMeta;
use crate::dialect::{ColumnClass, Dialect, resolve_paging};
use crate::value::{Value, is_numeric};

/// SQL Server rules: blacklist escaping, `OFFSET .. FETCH` paging, the full
/// GUID/datetime/numeric result-typing pipeline, and ANSI session flags
/// (required for linked-server UNION queries).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mssql;

impl Mssql {
    pub fn new() -> Self {
        Self
    }
}

/// Strip non-printable byte sequences, both raw (0x00-0x08, 0x0B, 0x0C,
/// 0x0E-0x1F) and their URL-encoded forms (`%00`-`%08`, `%0b`, `%0c`,
/// `%0e`-`%1f`).
fn strip_non_displayables(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let (a, b) = (bytes[i + 1], bytes[i + 2]);
            let encoded_low = a == b'0' && matches!(b, b'0'..=b'8' | b'b' | b'c' | b'e' | b'f');
            let encoded_high = a == b'1' && (b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
            if encoded_low || encoded_high {
                i += 3;
                continue;
            }
        }
        let c = input[i..].chars().next().expect("char boundary");
        if !matches!(c, '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}') {
            out.push(c);
        }
        i += c.len_utf8();
    }
    out
}

impl Dialect for Mssql {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn escape(&self, raw: &str) -> String {
        if is_numeric(raw) {
            return raw.to_string();
        }
        if raw.is_empty() {
            return String::new();
        }
        strip_non_displayables(raw).replace('\'', "''")
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>, page: Option<u64>) -> String {
        match resolve_paging(limit, offset, page) {
            Some((limit, offset)) => {
                format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
            }
            None => String::new(),
        }
    }

    fn classify(&self, meta: &ColumnMeta) -> ColumnClass {
        let ty = meta.native_type.to_ascii_lowercase();
        // The driver reports GUID columns as a 16-byte blob/unknown binary.
        if meta.max_length == 16
            && matches!(
                ty.as_str(),
                "blob" | "binary" | "varbinary" | "unknown" | "uniqueidentifier"
            )
        {
            return ColumnClass::Guid;
        }
        match ty.as_str() {
            "datetime" | "smalldatetime" => ColumnClass::DateTime,
            "bit" | "tinyint" | "smallint" | "int" | "bigint" => ColumnClass::Int,
            "float" | "real" | "money" | "smallmoney" | "decimal" | "numeric" => ColumnClass::Float,
            _ => ColumnClass::Plain,
        }
    }

    fn session_setup(&self) -> &'static [&'static str] {
        // Fixes multi-server UNION errors on linked servers.
        &["SET ANSI_NULLS ON", "SET ANSI_WARNINGS ON"]
    }

    fn identity_suffix(&self) -> &'static str {
        " SELECT @@IDENTITY"
    }

    fn procedure_call(&self, name: &str, params: &[(&str, Value)]) -> String {
        let mut sql = format!("EXEC {name}");
        for (i, (param, value)) in params.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&format!(" @{param} = {}", self.quote(value)));
        }
        sql
    }
}

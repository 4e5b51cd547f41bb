//! Result-set typing: column classification and value conversion.
//!
//! Drivers hand rows back loosely typed; GUIDs arrive as 16-byte blobs,
//! datetimes as whatever string rendering the client library favors, and
//! numerics sometimes as strings. On the first fetched row a classification
//! map is built from the driver's column metadata (once per result set) and
//! every row's classified columns are converted to canonical forms.

use crate::connection::Cursor;
use crate::dialect::{ColumnClass, Dialect};
use crate::error::{DbalError, DbalResult};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Per-result-set classification, positional, aligned with the cursor's
/// column order.
#[derive(Debug, Clone)]
pub(crate) struct TypeMap {
    classes: Vec<ColumnClass>,
}

impl TypeMap {
    /// Build the classification map from a cursor's column metadata.
    pub(crate) fn build(dialect: &dyn Dialect, cursor: &dyn Cursor) -> Self {
        let classes = (0..cursor.field_count())
            .map(|i| dialect.classify(cursor.column_meta(i)))
            .collect();
        Self { classes }
    }

    /// Convert one row in place. Nulls and `Plain` columns pass through
    /// untouched.
    pub(crate) fn convert_row(
        &self,
        columns: &[String],
        values: &mut [Value],
    ) -> DbalResult<()> {
        for (i, value) in values.iter_mut().enumerate() {
            let class = self.classes.get(i).copied().unwrap_or(ColumnClass::Plain);
            if class == ColumnClass::Plain || value.is_null() {
                continue;
            }
            let name = columns.get(i).map(String::as_str).unwrap_or("");
            *value = convert(class, std::mem::replace(value, Value::Null), name)?;
        }
        Ok(())
    }
}

fn convert(class: ColumnClass, value: Value, column: &str) -> DbalResult<Value> {
    match class {
        ColumnClass::Guid => decode_guid(&value)
            .map(Value::Text)
            .ok_or_else(|| DbalError::decode(column, "expected a 16-byte GUID")),
        ColumnClass::DateTime => {
            let raw = match &value {
                Value::Text(s) => s.as_str(),
                _ => {
                    return Err(DbalError::decode(column, "expected a datetime string"));
                }
            };
            normalize_datetime(raw)
                .map(Value::Text)
                .ok_or_else(|| DbalError::decode(column, format!("unparseable datetime '{raw}'")))
        }
        ColumnClass::Int => value
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| DbalError::decode(column, "expected an integer")),
        ColumnClass::Float => value
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| DbalError::decode(column, "expected a number")),
        ColumnClass::Plain => Ok(value),
    }
}

/// Decode a 16-byte GUID blob into canonical uppercase
/// `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` form.
///
/// The wire layout is mixed-endian: the first 4-byte group and the next two
/// 2-byte groups are little-endian, the remaining eight bytes big-endian.
fn decode_guid(value: &Value) -> Option<String> {
    let bytes: &[u8] = match value {
        Value::Bytes(b) => b,
        // Some drivers report binary columns as raw strings.
        Value::Text(s) => s.as_bytes(),
        _ => return None,
    };
    let bytes: [u8; 16] = bytes.try_into().ok()?;
    Some(
        Uuid::from_bytes_le(bytes)
            .as_hyphenated()
            .to_string()
            .to_ascii_uppercase(),
    )
}

/// Reparse a driver's datetime rendering and normalize it to
/// `YYYY-MM-DD HH:MM:SS`.
///
/// Accepted inputs: ISO with or without `T` and fractional seconds, the
/// legacy `Mon dd yyyy hh:mmAM` client-library form, and a bare date.
fn normalize_datetime(raw: &str) -> Option<String> {
    let squeezed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let parsed = NaiveDateTime::parse_from_str(&squeezed, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&squeezed, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(&squeezed, "%b %e %Y %I:%M%p"))
        .or_else(|_| NaiveDateTime::parse_from_str(&squeezed, "%b %e %Y %I:%M:%S%.f%p"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(&squeezed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
}

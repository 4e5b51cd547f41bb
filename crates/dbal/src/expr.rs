//! Predicate expressions for WHERE clauses.
//!
//! Conditions form a small tagged tree (comparison leaves plus `and`/`or`
//! nodes) instead of an accumulated string, so later transformations don't
//! have to re-parse text. Rendering stays byte-compatible with the flat
//! textual grammar: connectors are lowercase and chains associate
//! left-to-right without parentheses.

use crate::dialect::Dialect;
use crate::value::Value;

/// All of the accepted comparison operators.
pub const OPERATORS: [&str; 16] = [
    "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "between", "ilike", "&", "|", "^",
    "<<", ">>",
];

/// Validate an operator against the allow-list (case-insensitive).
///
/// An unrecognized operator silently degrades to `=`; a recognized one keeps
/// the caller's spelling.
pub fn validate_operator(op: &str) -> String {
    if OPERATORS.iter().any(|o| o.eq_ignore_ascii_case(op)) {
        op.to_string()
    } else {
        "=".to_string()
    }
}

/// A WHERE condition node.
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// `column op value`, quoted at render time.
    Compare {
        column: String,
        op: String,
        value: Value,
    },
    /// Raw SQL fragment used verbatim; escaping is the caller's business.
    Raw(String),
    /// `left and right`
    And(Box<Cond>, Box<Cond>),
    /// `left or right`
    Or(Box<Cond>, Box<Cond>),
}

impl Cond {
    /// Create a comparison condition. The operator is validated against
    /// [`OPERATORS`] and degrades to `=` when unrecognized.
    pub fn compare(column: impl Into<String>, op: &str, value: impl Into<Value>) -> Self {
        Cond::Compare {
            column: column.into(),
            op: validate_operator(op),
            value: value.into(),
        }
    }

    /// Create an equality condition.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Cond::compare(column, "=", value)
    }

    /// Create a raw SQL fragment condition.
    pub fn raw(sql: impl Into<String>) -> Self {
        Cond::Raw(sql.into())
    }

    /// Append `next` onto an optional prior condition with the given
    /// connector, preserving left-to-right chaining.
    pub fn chain(prior: Option<Cond>, next: Cond, or: bool) -> Cond {
        match prior {
            Some(prev) => {
                if or {
                    Cond::Or(Box::new(prev), Box::new(next))
                } else {
                    Cond::And(Box::new(prev), Box::new(next))
                }
            }
            None => next,
        }
    }

    /// Render this condition to SQL text.
    pub fn render(&self, dialect: &dyn Dialect) -> String {
        match self {
            Cond::Compare { column, op, value } => {
                format!("{column} {op} {}", dialect.quote(value))
            }
            Cond::Raw(sql) => sql.clone(),
            Cond::And(left, right) => {
                format!("{} and {}", left.render(dialect), right.render(dialect))
            }
            Cond::Or(left, right) => {
                format!("{} or {}", left.render(dialect), right.render(dialect))
            }
        }
    }
}

//! Dialect profile trait.

use crate::ast::Value;

/// Dialect-specific SQL rendering.
///
/// `quote_identifier` and `quote_value` are the only two paths by which
/// caller-supplied names and literals reach the SQL text.
pub trait SqlGenerator {
    /// Quote a single identifier (table, column, or alias name).
    fn quote_identifier(&self, name: &str) -> String;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Get the boolean literal (TRUE/FALSE vs 1/0).
    fn bool_literal(&self, val: bool) -> String;

    /// Whether `SELECT DISTINCT ON (...)` is available.
    fn supports_distinct_on(&self) -> bool;

    /// Render the trailing LIMIT/OFFSET clause, with a leading space.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String;

    /// Capitalize the first letter of `expr` and lowercase the rest.
    fn title_case(&self, expr: &str) -> String;

    /// Wrap a SELECT that carries ORDER BY or LIMIT so it can be the first
    /// operand of a UNION.
    fn union_operand(&self, select: &str) -> String {
        format!("({})", select)
    }

    /// Quote a possibly dotted name (`alias.column`) part by part.
    fn quote_qualified(&self, name: &str) -> String {
        name.split('.')
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render a literal value.
    fn quote_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_literal(*b),
            Value::Int(n) => n.to_string(),
            Value::Float(n) if n.is_finite() => n.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::String(s) => self.quote_string(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.quote_value(v)).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

/// LIMIT/OFFSET as two separate clauses; zero offsets are omitted.
pub(crate) fn limit_then_offset(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = String::new();
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }
    if let Some(n) = offset.filter(|n| *n > 0) {
        sql.push_str(&format!(" OFFSET {}", n));
    }
    sql
}

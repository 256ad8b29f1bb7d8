//! Token whitelists and free-text expression screening.
//!
//! Every caller-supplied token that ends up in SQL without going through
//! identifier or value quoting is checked here first. Validators only accept
//! or reject; they never rewrite their input.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{AggregateFunc, JoinKind, LogicalOp, Operator, SortOrder};
use crate::error::{TokenKind, ValidationError};

pub const OPERATORS: &[&str] = &[
    "eq",
    "ne",
    "gt",
    "gte",
    "lt",
    "lte",
    "in",
    "not_in",
    "like",
    "not_like",
    "is_null",
    "is_not_null",
];

pub const DIRECTIONS: &[&str] = &["ASC", "DESC"];

pub const JOIN_TYPES: &[&str] = &["INNER", "LEFT", "RIGHT", "FULL", "CROSS"];

pub const LOGIC: &[&str] = &["AND", "OR"];

pub const AGGREGATES: &[&str] = &[
    "SUM",
    "AVG",
    "MIN",
    "MAX",
    "COUNT",
    "COUNT DISTINCT",
    "<function name>",
];

static FORBIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|TRUNCATE|UNION|INTERSECT|EXCEPT",
        r"|EXEC|GRANT|REVOKE|INFORMATION_SCHEMA|WAITFOR|DELAY|SHUTDOWN",
        r"|PG_|MYSQL\.|SLEEP\s*\(|BENCHMARK\s*\(",
        r"|\b(?:XP|SP)_",
    ))
    .expect("forbidden keyword pattern")
});

static DML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SELECT|INSERT|UPDATE|DELETE").expect("dml keyword pattern"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

const COMMENT_MARKERS: &[&str] = &["--", "/*", "*/", ";"];

/// Treat `None` and blank strings alike.
fn present(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}

/// Canonicalize a filter operator.
///
/// Accepts the canonical names, the SQL symbols, and space-separated
/// spellings (`not in`, `is not null`), case-insensitively.
pub fn validate_operator(op: &str) -> Result<Operator, ValidationError> {
    let normalized = op.trim().to_lowercase().replace(' ', "_");
    let operator = match normalized.as_str() {
        "eq" | "=" | "==" => Operator::Eq,
        "ne" | "neq" | "!=" | "<>" => Operator::Ne,
        "gt" | ">" => Operator::Gt,
        "gte" | ">=" => Operator::Gte,
        "lt" | "<" => Operator::Lt,
        "lte" | "<=" => Operator::Lte,
        "in" => Operator::In,
        "not_in" => Operator::NotIn,
        "like" => Operator::Like,
        "not_like" => Operator::NotLike,
        "is_null" => Operator::IsNull,
        "is_not_null" => Operator::IsNotNull,
        _ => return Err(ValidationError::token(TokenKind::Operator, op, OPERATORS)),
    };
    Ok(operator)
}

/// `ASC` or `DESC`, defaulting to `ASC`.
pub fn validate_direction(direction: Option<&str>) -> Result<SortOrder, ValidationError> {
    let Some(raw) = present(direction) else {
        return Ok(SortOrder::Asc);
    };
    match raw.to_uppercase().as_str() {
        "ASC" => Ok(SortOrder::Asc),
        "DESC" => Ok(SortOrder::Desc),
        _ => Err(ValidationError::token(TokenKind::Direction, raw, DIRECTIONS)),
    }
}

/// `INNER | LEFT | RIGHT | FULL | CROSS`, defaulting to `LEFT`.
pub fn validate_join_type(join_type: Option<&str>) -> Result<JoinKind, ValidationError> {
    let Some(raw) = present(join_type) else {
        return Ok(JoinKind::Left);
    };
    match raw.to_uppercase().as_str() {
        "INNER" => Ok(JoinKind::Inner),
        "LEFT" => Ok(JoinKind::Left),
        "RIGHT" => Ok(JoinKind::Right),
        "FULL" => Ok(JoinKind::Full),
        "CROSS" => Ok(JoinKind::Cross),
        _ => Err(ValidationError::token(TokenKind::JoinType, raw, JOIN_TYPES)),
    }
}

/// `AND` or `OR`, defaulting to `AND`.
pub fn validate_logic(logic: Option<&str>) -> Result<LogicalOp, ValidationError> {
    let Some(raw) = present(logic) else {
        return Ok(LogicalOp::And);
    };
    match raw.to_uppercase().as_str() {
        "AND" => Ok(LogicalOp::And),
        "OR" => Ok(LogicalOp::Or),
        _ => Err(ValidationError::token(TokenKind::Logic, raw, LOGIC)),
    }
}

/// Canonicalize an aggregate function name.
///
/// Unknown names are accepted as long as they are plain identifiers and not
/// a forbidden keyword, so `STRING_AGG` or `MEDIAN` pass through uppercased.
pub fn validate_aggregate(function: Option<&str>) -> Result<AggregateFunc, ValidationError> {
    let raw = present(function).unwrap_or_default();
    let normalized = raw.to_lowercase().replace(' ', "_");
    let func = match normalized.as_str() {
        "sum" => AggregateFunc::Sum,
        "avg" | "mean" => AggregateFunc::Avg,
        "min" => AggregateFunc::Min,
        "max" => AggregateFunc::Max,
        "count" => AggregateFunc::Count,
        "count_distinct" | "countdistinct" => AggregateFunc::CountDistinct,
        _ => {
            let upper = raw.to_uppercase();
            if !IDENTIFIER.is_match(raw) || FORBIDDEN.is_match(&upper) {
                return Err(ValidationError::token(
                    TokenKind::Aggregate,
                    raw,
                    AGGREGATES,
                ));
            }
            AggregateFunc::Other(upper)
        }
    };
    Ok(func)
}

/// Screen a free-text SQL expression (calculated columns, cast targets,
/// replacement expressions).
///
/// Returns the trimmed input unchanged on success.
pub fn validate_expression(expression: &str) -> Result<&str, ValidationError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::expression(
            expression,
            "expression is empty",
        ));
    }

    if let Some(marker) = COMMENT_MARKERS.iter().find(|m| trimmed.contains(**m)) {
        return Err(ValidationError::expression(
            trimmed,
            format!("'{}' is not allowed", marker),
        ));
    }

    if let Err(reason) = scan_quotes(trimmed) {
        return Err(ValidationError::expression(trimmed, reason));
    }

    let upper = trimmed.to_uppercase();

    if trimmed.contains('(') && DML.is_match(&upper) {
        return Err(ValidationError::expression(
            trimmed,
            "subqueries are not allowed",
        ));
    }

    if let Some(found) = FORBIDDEN.find(&upper) {
        return Err(ValidationError::expression(
            trimmed,
            format!("forbidden keyword '{}'", found.as_str().trim_end_matches('(').trim()),
        ));
    }

    Ok(trimmed)
}

/// Walk the expression the way a SQL lexer would and make sure every quoted
/// run is closed. Quotes are only escaped by doubling.
///
/// Backslashes are rejected everywhere (MySQL and PostgreSQL `E'...'` strings
/// treat `\'` as an escaped quote), and so are `$` outside quotes (PostgreSQL
/// dollar quoting).
fn scan_quotes(expression: &str) -> Result<(), String> {
    if expression.contains('\\') {
        return Err("backslashes are not allowed".to_string());
    }

    let mut open: Option<char> = None;
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        match open {
            Some(quote) if c == quote => {
                if chars.peek() == Some(&quote) {
                    chars.next();
                } else {
                    open = None;
                }
            }
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => open = Some(c),
                '$' => return Err("'$' is not allowed".to_string()),
                _ => {}
            },
        }
    }

    match open {
        Some(quote) => Err(format!("unbalanced {} quote", quote)),
        None => Ok(()),
    }
}

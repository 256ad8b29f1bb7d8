use super::super::traits::{SqlGenerator, limit_then_offset};

pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn quote_identifier(&self, id: &str) -> String {
        format!("\"{}\"", id.replace('"', "\"\""))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val {
            "1".to_string()
        } else {
            "0".to_string()
        }
    }

    fn supports_distinct_on(&self) -> bool {
        false
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        match (limit, offset.filter(|n| *n > 0)) {
            (None, Some(m)) => format!(" LIMIT -1 OFFSET {}", m),
            (limit, offset) => limit_then_offset(limit, offset),
        }
    }

    fn title_case(&self, expr: &str) -> String {
        format!("UPPER(SUBSTR({e}, 1, 1)) || LOWER(SUBSTR({e}, 2))", e = expr)
    }

    // Compound operands can't be parenthesized in SQLite.
    fn union_operand(&self, select: &str) -> String {
        format!("SELECT * FROM ({}) AS t0", select)
    }
}

use crate::transpiler::traits::SqlGenerator;

/// Largest row count MySQL accepts; stands in for "no limit" when only an
/// offset is requested.
const MAX_ROWS: u64 = 18_446_744_073_709_551_615;

/// MySQL Generator.
pub struct MysqlGenerator;

impl Default for MysqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MysqlGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SqlGenerator for MysqlGenerator {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    // Backslash is an escape character in MySQL string literals by default.
    fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn supports_distinct_on(&self) -> bool {
        false
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // LIMIT [offset,] row_count
        match (limit, offset.filter(|n| *n > 0)) {
            (Some(n), Some(m)) => format!(" LIMIT {}, {}", m, n),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, Some(m)) => format!(" LIMIT {}, {}", m, MAX_ROWS),
            (None, None) => String::new(),
        }
    }

    fn title_case(&self, expr: &str) -> String {
        format!(
            "CONCAT(UPPER(LEFT({e}, 1)), LOWER(SUBSTRING({e}, 2)))",
            e = expr
        )
    }
}

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transpiler::sql::mysql::MysqlGenerator;
use crate::transpiler::sql::postgres::PostgresGenerator;
use crate::transpiler::sql::sqlite::SqliteGenerator;
use crate::transpiler::traits::SqlGenerator;

/// Supported SQL Dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySQL,
    #[serde(alias = "sqlite3")]
    SQLite,
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn SqlGenerator> {
        match self {
            Dialect::Postgres => Box::new(PostgresGenerator),
            Dialect::MySQL => Box::new(MysqlGenerator),
            Dialect::SQLite => Box::new(SqliteGenerator),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            other => Err(format!(
                "Unknown dialect '{}'. Expected: postgres, mysql, sqlite",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySQL);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::SQLite);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_profiles() {
        assert!(Dialect::Postgres.generator().supports_distinct_on());
        assert!(!Dialect::MySQL.generator().supports_distinct_on());
        assert!(!Dialect::SQLite.generator().supports_distinct_on());
        assert_eq!(Dialect::MySQL.generator().quote_identifier("a"), "`a`");
    }

    #[test]
    fn test_serde_names() {
        let d: Dialect = serde_json::from_str("\"pg\"").unwrap();
        assert_eq!(d, Dialect::Postgres);
        assert_eq!(serde_json::to_string(&Dialect::MySQL).unwrap(), "\"mysql\"");
    }
}

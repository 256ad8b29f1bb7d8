//! # recipe-sql
//!
//! Compiles stored transform recipes (ordered, declarative steps such as
//! select, filter, join, group, deduplicate, union and column clean-ups)
//! into a single dialect-correct SQL statement.
//!
//! ## Quick Example
//!
//! ```
//! use recipe_sql::prelude::*;
//!
//! let recipe = Recipe::from_json(r#"{
//!     "source_schema": "public",
//!     "source_table": "orders",
//!     "steps": [
//!         {"type": "filter", "conditions": [
//!             {"column": "customer", "operator": "eq", "value": "O'Brien"}
//!         ]},
//!         {"type": "sort", "columns": [{"column": "created_at", "direction": "desc"}]}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(
//!     recipe.to_sql().unwrap(),
//!     "SELECT t.* FROM \"public\".\"orders\" AS t WHERE (\"customer\" = 'O''Brien') ORDER BY \"created_at\" DESC"
//! );
//! ```
//!
//! ## Steps
//!
//! | Step          | Effect                                         |
//! |---------------|------------------------------------------------|
//! | `select`      | Explicit column list                           |
//! | `rename`      | `col AS alias`                                 |
//! | `reorder`     | Output column order                            |
//! | `drop_column` | Remove columns from an explicit list           |
//! | `add_column`  | Calculated column from a screened expression   |
//! | `cast`        | `CAST(col AS type)`                            |
//! | `replace`     | `REPLACE(...)` / `COALESCE(...)`               |
//! | `trim`        | `TRIM` / `LTRIM` / `RTRIM`                     |
//! | `case`        | `UPPER` / `LOWER` / title case                 |
//! | `fill_null`   | `CASE WHEN col IS NULL ... END`                |
//! | `filter`      | `WHERE (...)`                                  |
//! | `sort`        | `ORDER BY`                                     |
//! | `join`        | `LEFT JOIN ... AS j1 ON ...`                   |
//! | `group_by`    | `GROUP BY` with aggregations                   |
//! | `deduplicate` | `DISTINCT` / `DISTINCT ON` / `GROUP BY`        |
//! | `limit`       | `LIMIT` / `OFFSET`                             |
//! | `union`       | `UNION [ALL]` against another table            |

pub mod ast;
pub mod config;
pub mod error;
pub mod recipe;
pub mod transpiler;
pub mod validator;

pub use recipe::Recipe;
pub use transpiler::{Dialect, compile, compile_count};

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::CompilerConfig;
    pub use crate::error::*;
    pub use crate::recipe::Recipe;
    pub use crate::transpiler::{Dialect, SqlGenerator, compile, compile_count};
    pub use crate::validator::validate_expression;
}

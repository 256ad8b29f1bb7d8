//! Stored recipe records.

use serde::{Deserialize, Serialize};

use crate::ast::TransformStep;
use crate::error::RecipeResult;
use crate::transpiler::{self, Dialect};

fn default_schema() -> String {
    "public".to_string()
}

/// A transform recipe as persisted by the surrounding system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default = "default_schema")]
    pub source_schema: String,
    pub source_table: String,
    #[serde(default)]
    pub steps: Vec<TransformStep>,
    /// Target dialect, when the record pins one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

impl Recipe {
    pub fn new(source_schema: &str, source_table: &str) -> Self {
        Self {
            source_schema: source_schema.to_string(),
            source_table: source_table.to_string(),
            steps: Vec::new(),
            dialect: None,
        }
    }

    /// Append a step.
    pub fn step(mut self, step: TransformStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Decode a recipe from its JSON form.
    pub fn from_json(input: &str) -> RecipeResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Pinned dialect, else `fallback`.
    pub fn dialect_or(&self, fallback: Dialect) -> Dialect {
        self.dialect.unwrap_or(fallback)
    }

    /// Compile with the recipe's own dialect (PostgreSQL when unset).
    pub fn to_sql(&self) -> RecipeResult<String> {
        self.to_sql_with(self.dialect_or(Dialect::default()), None, None, None)
    }

    pub fn to_sql_with(
        &self,
        dialect: Dialect,
        limit: Option<u64>,
        offset: Option<u64>,
        available_columns: Option<&[String]>,
    ) -> RecipeResult<String> {
        transpiler::compile(
            dialect,
            &self.source_table,
            &self.source_schema,
            &self.steps,
            limit,
            offset,
            available_columns,
        )
    }

    pub fn to_count_sql(&self, dialect: Dialect) -> RecipeResult<String> {
        transpiler::compile_count(dialect, &self.source_table, &self.source_schema, &self.steps)
    }
}

//! Recipe to SQL compiler.
//!
//! Folds recipe steps into a [`CompilationState`] and renders it for a
//! [`Dialect`].

pub mod dialect;
pub mod select;
pub mod sql;
pub mod state;
pub mod steps;
pub mod traits;

#[cfg(test)]
mod tests;

use tracing::{debug, trace};

use crate::ast::TransformStep;
use crate::error::{RecipeError, RecipeResult};

pub use dialect::Dialect;
pub use select::{Source, build_select};
pub use state::{CompilationState, Pagination};
pub use steps::{StepContext, apply_step};
pub use traits::SqlGenerator;

/// Fold `steps` into a fresh state.
pub fn fold_steps(
    generator: &dyn SqlGenerator,
    source_schema: &str,
    steps: &[TransformStep],
) -> RecipeResult<CompilationState> {
    let ctx = StepContext {
        generator,
        source_schema,
    };
    let mut state = CompilationState::new();
    for (index, step) in steps.iter().enumerate() {
        trace!(index, step = step.kind(), "applying step");
        apply_step(&mut state, index, step, &ctx)?;
    }
    Ok(state)
}

/// Compile a recipe into one SQL statement.
///
/// `limit`/`offset` are the caller's pagination; a `limit` step in the recipe
/// takes precedence over both. `available_columns` lets wildcard selections
/// with column transforms expand to the full column list.
///
/// ```
/// use recipe_sql::ast::*;
/// use recipe_sql::transpiler::{compile, Dialect};
///
/// let steps = vec![TransformStep::Filter(FilterStep {
///     logic: None,
///     conditions: vec![FilterCondition {
///         column: "status".into(),
///         operator: Some("=".into()),
///         value: Value::from("active"),
///     }],
/// })];
/// let sql = compile(Dialect::Postgres, "orders", "public", &steps, Some(10), None, None).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT t.* FROM \"public\".\"orders\" AS t WHERE (\"status\" = 'active') LIMIT 10"
/// );
/// ```
pub fn compile(
    dialect: Dialect,
    source_table: &str,
    source_schema: &str,
    steps: &[TransformStep],
    limit: Option<u64>,
    offset: Option<u64>,
    available_columns: Option<&[String]>,
) -> RecipeResult<String> {
    let source_table = source_table.trim();
    if source_table.is_empty() {
        return Err(RecipeError::InvalidSource(
            "source table name is empty".to_string(),
        ));
    }
    let source_schema = source_schema.trim();

    debug!(
        %dialect,
        schema = source_schema,
        table = source_table,
        steps = steps.len(),
        "compiling recipe"
    );

    let generator = dialect.generator();
    let state = fold_steps(generator.as_ref(), source_schema, steps)?;
    let sql = build_select(
        &state,
        generator.as_ref(),
        Source {
            schema: source_schema,
            table: source_table,
        },
        Pagination { limit, offset },
        available_columns,
    );

    debug!(len = sql.len(), "recipe compiled");
    Ok(sql)
}

/// Compile a row-count query for the recipe, ignoring pagination.
pub fn compile_count(
    dialect: Dialect,
    source_table: &str,
    source_schema: &str,
    steps: &[TransformStep],
) -> RecipeResult<String> {
    let inner = compile(dialect, source_table, source_schema, steps, None, None, None)?;
    Ok(wrap_count(&inner))
}

pub(crate) fn wrap_count(inner: &str) -> String {
    format!("SELECT COUNT(*) AS total FROM ({}) AS count_subquery", inner)
}

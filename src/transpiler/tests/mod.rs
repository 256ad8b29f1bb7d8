//! Transpiler tests organized by category.

mod dialects;

use crate::ast::TransformStep;
use crate::error::RecipeResult;
use crate::transpiler::{Dialect, compile};

fn steps(json: &str) -> Vec<TransformStep> {
    serde_json::from_str(json).expect("test steps decode")
}

/// Compile against `public.orders` with no pagination.
fn sql(dialect: Dialect, json: &str) -> RecipeResult<String> {
    compile(dialect, "orders", "public", &steps(json), None, None, None)
}

fn pg(json: &str) -> String {
    sql(Dialect::Postgres, json).expect("recipe compiles")
}

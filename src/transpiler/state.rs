//! The accumulator threaded through step interpretation.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::AggregateFunc;
use crate::transpiler::traits::SqlGenerator;

/// Alias of the recipe's source table in every rendered FROM clause.
pub const BASE_ALIAS: &str = "t";

/// The working column list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnList {
    #[default]
    Wildcard,
    Explicit(Vec<String>),
}

impl ColumnList {
    pub fn is_explicit(&self) -> bool {
        matches!(self, ColumnList::Explicit(_))
    }
}

/// How duplicate rows are suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DedupMode {
    #[default]
    None,
    All,
    On(Vec<String>),
}

/// A column whose value is overridden by an expression, keeping its name and
/// position in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedColumn {
    pub column: String,
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateColumn {
    pub func: AggregateFunc,
    /// Source column, or `*`.
    pub column: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grouping {
    pub columns: Vec<String>,
    pub aggregations: Vec<AggregateColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none_or(|n| n == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTarget {
    pub schema: String,
    pub table: String,
    pub all: bool,
}

/// Cumulative effect of the steps folded so far.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationState {
    pub columns: ColumnList,
    /// Original column name to output alias.
    pub renames: BTreeMap<String, String>,
    pub dropped: BTreeSet<String>,
    /// `(expression, alias)` in step order; duplicates are kept.
    pub added: Vec<(String, String)>,
    pub transformed: Vec<TransformedColumn>,
    /// Rendered, parenthesized groups, AND-ed together.
    pub where_groups: Vec<String>,
    pub grouping: Option<Grouping>,
    /// Rendered `expr ASC|DESC` terms.
    pub order_by: Vec<String>,
    /// Rendered join clauses.
    pub joins: Vec<String>,
    pub dedup: DedupMode,
    /// Set by a `limit` step; overrides the caller's pagination.
    pub pipeline_limit: Option<Pagination>,
    pub unions: Vec<UnionTarget>,
    pub display_order: Option<Vec<String>>,
    pub select_applied: bool,
}

impl CompilationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform_for(&self, column: &str) -> Option<&TransformedColumn> {
        self.transformed.iter().find(|t| t.column == column)
    }

    /// Register or replace the override expression of `column`.
    pub fn set_transform(&mut self, column: &str, expression: String) {
        match self.transformed.iter_mut().find(|t| t.column == column) {
            Some(existing) => existing.expression = expression,
            None => self.transformed.push(TransformedColumn {
                column: column.to_string(),
                expression,
            }),
        }
    }

    /// Reference to `column` in WHERE / ORDER BY / GROUP BY position.
    pub fn column_ref(&self, column: &str, generator: &dyn SqlGenerator) -> String {
        match self.transform_for(column) {
            Some(t) => t.expression.clone(),
            None => generator.quote_qualified(column),
        }
    }

    /// Reference to `column` as the input of a select-list expression.
    pub fn source_ref(&self, column: &str, generator: &dyn SqlGenerator) -> String {
        if let Some(t) = self.transform_for(column) {
            return t.expression.clone();
        }
        qualify(column, generator)
    }

    /// Output name of `column` after renames.
    pub fn output_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.renames.get(column).map(String::as_str).unwrap_or(column)
    }
}

/// `t.<col>` for bare names; dotted names are quoted part by part.
pub fn qualify(column: &str, generator: &dyn SqlGenerator) -> String {
    if column.contains('.') {
        generator.quote_qualified(column)
    } else {
        format!("{}.{}", BASE_ALIAS, generator.quote_identifier(column))
    }
}

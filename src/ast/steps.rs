//! Recipe step records.
//!
//! Steps are stored as JSON objects tagged by `"type"`. Fields a recipe
//! author can forget are defaulted at decode time and checked by the step
//! interpreter, so a missing field is reported against its step index
//! instead of failing the whole document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::operators::{LetterCase, TrimSide};
use super::values::Value;

/// One declarative operation of a transform recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformStep {
    Select(SelectStep),
    Rename(RenameStep),
    Reorder(ReorderStep),
    Cast(CastStep),
    AddColumn(AddColumnStep),
    DropColumn(DropColumnStep),
    Filter(FilterStep),
    Sort(SortStep),
    Deduplicate(DeduplicateStep),
    Limit(LimitStep),
    Replace(ReplaceStep),
    Trim(TrimStep),
    Case(CaseStep),
    FillNull(FillNullStep),
    Join(JoinStep),
    Union(UnionStep),
    GroupBy(GroupByStep),
}

impl TransformStep {
    /// The `"type"` tag of this step.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformStep::Select(_) => "select",
            TransformStep::Rename(_) => "rename",
            TransformStep::Reorder(_) => "reorder",
            TransformStep::Cast(_) => "cast",
            TransformStep::AddColumn(_) => "add_column",
            TransformStep::DropColumn(_) => "drop_column",
            TransformStep::Filter(_) => "filter",
            TransformStep::Sort(_) => "sort",
            TransformStep::Deduplicate(_) => "deduplicate",
            TransformStep::Limit(_) => "limit",
            TransformStep::Replace(_) => "replace",
            TransformStep::Trim(_) => "trim",
            TransformStep::Case(_) => "case",
            TransformStep::FillNull(_) => "fill_null",
            TransformStep::Join(_) => "join",
            TransformStep::Union(_) => "union",
            TransformStep::GroupBy(_) => "group_by",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SelectStep {
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Original column name to output alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RenameStep {
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReorderStep {
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CastStep {
    #[serde(default)]
    pub column: String,
    #[serde(default, alias = "target_type", alias = "to")]
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AddColumnStep {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DropColumnStep {
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterCondition {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FilterStep {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub logic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SortKey {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SortStep {
    #[serde(default)]
    pub columns: Vec<SortKey>,
}

/// Empty `columns` means whole-row deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeduplicateStep {
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LimitStep {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Substring replacement, or null replacement when `old_value` is absent.
///
/// The replacement is `new_value` as a literal, or `expression` when given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplaceStep {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Value,
    #[serde(default)]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrimStep {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub side: TrimSide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CaseStep {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub mode: Option<LetterCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillNullStep {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub value: Value,
    /// Treat empty strings like NULL.
    #[serde(default = "default_true")]
    pub include_empty: bool,
}

fn default_true() -> bool {
    true
}

/// `left` is resolved against the base table, `right` against the joined one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JoinKey {
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JoinStep {
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub join_type: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub on: Vec<JoinKey>,
    #[serde(default)]
    pub select_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnionStep {
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Aggregation {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GroupByStep {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tagged_steps() {
        let steps: Vec<TransformStep> = serde_json::from_str(
            r#"[
                {"type": "select", "columns": ["id", "email"]},
                {"type": "filter", "logic": "or", "conditions": [
                    {"column": "status", "operator": "=", "value": "active"}
                ]},
                {"type": "fill_null", "column": "city", "value": "unknown"},
                {"type": "case", "column": "name", "mode": "title"}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].kind(), "select");
        match &steps[1] {
            TransformStep::Filter(f) => {
                assert_eq!(f.logic.as_deref(), Some("or"));
                assert_eq!(f.conditions[0].value, Value::from("active"));
            }
            other => panic!("expected filter, got {:?}", other),
        }
        match &steps[2] {
            TransformStep::FillNull(f) => assert!(f.include_empty),
            other => panic!("expected fill_null, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let step: TransformStep = serde_json::from_str(r#"{"type": "add_column"}"#).unwrap();
        assert_eq!(step, TransformStep::AddColumn(AddColumnStep::default()));
    }
}

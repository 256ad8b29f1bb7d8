//! Step interpreter: folds recipe steps into a [`CompilationState`].

use crate::ast::*;
use crate::error::{RecipeError, RecipeResult};
use crate::transpiler::state::{
    AggregateColumn, ColumnList, CompilationState, DedupMode, Grouping, Pagination, UnionTarget,
    qualify,
};
use crate::transpiler::traits::SqlGenerator;
use crate::validator::{
    validate_aggregate, validate_direction, validate_expression, validate_join_type,
    validate_logic, validate_operator,
};

/// Inputs every step may consult besides the state itself.
pub struct StepContext<'a> {
    pub generator: &'a dyn SqlGenerator,
    pub source_schema: &'a str,
}

/// Apply one step. `index` is only used for error reporting.
pub fn apply_step(
    state: &mut CompilationState,
    index: usize,
    step: &TransformStep,
    ctx: &StepContext<'_>,
) -> RecipeResult<()> {
    let kind = step.kind();
    let g = ctx.generator;

    match step {
        TransformStep::Select(s) => {
            let columns = non_empty(&s.columns);
            if columns.is_empty() {
                return Err(RecipeError::malformed(
                    index,
                    kind,
                    "'columns' must list at least one column",
                ));
            }
            state.columns = ColumnList::Explicit(columns);
            state.select_applied = true;
        }

        TransformStep::Rename(s) => {
            for (from, to) in &s.mapping {
                let (from, to) = (from.trim(), to.trim());
                if from.is_empty() || to.is_empty() {
                    return Err(RecipeError::malformed(
                        index,
                        kind,
                        "rename mapping entries need both a column and an alias",
                    ));
                }
                state.renames.insert(from.to_string(), to.to_string());
            }
        }

        TransformStep::DropColumn(s) => {
            let columns = non_empty(&s.columns);
            state.dropped.extend(columns.iter().cloned());
            // Only an explicit list can shrink; wildcard selection is left alone.
            if let ColumnList::Explicit(list) = &mut state.columns {
                list.retain(|c| !columns.contains(c));
            }
        }

        TransformStep::AddColumn(s) => {
            let (Some(name), Some(expression)) = (required(&s.name), required(&s.expression))
            else {
                return Err(RecipeError::malformed(
                    index,
                    kind,
                    "requires both 'name' and 'expression'",
                ));
            };
            let expression = validate_expression(expression).map_err(|e| e.at(index, kind))?;
            state
                .added
                .push((expression.to_string(), name.to_string()));
        }

        TransformStep::Filter(s) => {
            let logic = validate_logic(s.logic.as_deref()).map_err(|e| e.at(index, kind))?;
            let mut parts = Vec::new();
            for cond in &s.conditions {
                if cond.column.trim().is_empty() {
                    continue;
                }
                let op = validate_operator(cond.operator.as_deref().unwrap_or_default())
                    .map_err(|e| e.at(index, kind))?;
                let column = state.column_ref(&cond.column, g);
                parts.push(render_condition(&column, op, &cond.value, g));
            }
            if !parts.is_empty() {
                let joiner = format!(" {} ", logic.sql_keyword());
                state.where_groups.push(format!("({})", parts.join(&joiner)));
            }
        }

        TransformStep::Sort(s) => {
            for key in &s.columns {
                if key.column.trim().is_empty() {
                    continue;
                }
                let dir =
                    validate_direction(key.direction.as_deref()).map_err(|e| e.at(index, kind))?;
                state.order_by.push(format!(
                    "{} {}",
                    state.column_ref(&key.column, g),
                    dir.sql_keyword()
                ));
            }
        }

        TransformStep::Join(s) => apply_join(state, index, s, ctx)?,

        TransformStep::GroupBy(s) => {
            let columns = non_empty(&s.columns);
            let mut aggregations = Vec::with_capacity(s.aggregations.len());
            for agg in &s.aggregations {
                let func = validate_aggregate(agg.function.as_deref())
                    .map_err(|e| e.at(index, kind))?;
                let column = match agg.column.trim() {
                    "" if func == AggregateFunc::Count => "*".to_string(),
                    "" => {
                        return Err(RecipeError::malformed(
                            index,
                            kind,
                            format!("aggregation {} needs a 'column'", func),
                        ));
                    }
                    c => c.to_string(),
                };
                let alias = match required(&agg.alias) {
                    Some(a) => a.to_string(),
                    None => default_aggregate_alias(&func, &column),
                };
                aggregations.push(AggregateColumn {
                    func,
                    column,
                    alias,
                });
            }
            if columns.is_empty() && aggregations.is_empty() {
                return Err(RecipeError::malformed(
                    index,
                    kind,
                    "requires 'columns' or 'aggregations'",
                ));
            }
            state.grouping = Some(Grouping {
                columns,
                aggregations,
            });
        }

        TransformStep::Deduplicate(s) => {
            let columns = non_empty(&s.columns);
            state.dedup = if columns.is_empty() {
                DedupMode::All
            } else {
                DedupMode::On(columns)
            };
        }

        TransformStep::Limit(s) => {
            state.pipeline_limit = Some(Pagination {
                limit: s.count,
                offset: s.offset,
            });
        }

        TransformStep::Reorder(s) => {
            let columns = non_empty(&s.columns);
            if !state.select_applied {
                let seeded = columns
                    .iter()
                    .filter(|c| !state.dropped.contains(*c))
                    .cloned()
                    .collect();
                state.columns = ColumnList::Explicit(seeded);
            }
            state.display_order = Some(columns);
        }

        TransformStep::Union(s) => {
            let table = s.table.trim();
            if table.is_empty() {
                return Err(RecipeError::malformed(index, kind, "missing 'table'"));
            }
            let schema = required(&s.schema).unwrap_or(ctx.source_schema);
            state.unions.push(UnionTarget {
                schema: schema.to_string(),
                table: table.to_string(),
                all: s.all,
            });
        }

        TransformStep::Cast(s) => {
            let column = target_column(&s.column, index, kind)?;
            if s.data_type.trim().is_empty() {
                return Err(RecipeError::malformed(index, kind, "missing 'data_type'"));
            }
            let data_type = validate_expression(&s.data_type).map_err(|e| e.at(index, kind))?;
            let expr = format!("CAST({} AS {})", state.source_ref(column, g), data_type);
            state.set_transform(column, expr);
        }

        TransformStep::Replace(s) => {
            let column = target_column(&s.column, index, kind)?;
            let replacement = match required(&s.expression) {
                Some(e) => validate_expression(e)
                    .map_err(|e| e.at(index, kind))?
                    .to_string(),
                None => g.quote_value(&s.new_value),
            };
            let source = state.source_ref(column, g);
            let expr = match &s.old_value {
                Some(old) => format!(
                    "REPLACE({}, {}, {})",
                    source,
                    g.quote_string(old),
                    replacement
                ),
                None => format!("COALESCE({}, {})", source, replacement),
            };
            state.set_transform(column, expr);
        }

        TransformStep::Trim(s) => {
            let column = target_column(&s.column, index, kind)?;
            let func = match s.side {
                TrimSide::Both => "TRIM",
                TrimSide::Leading => "LTRIM",
                TrimSide::Trailing => "RTRIM",
            };
            let expr = format!("{}({})", func, state.source_ref(column, g));
            state.set_transform(column, expr);
        }

        TransformStep::Case(s) => {
            let column = target_column(&s.column, index, kind)?;
            let Some(mode) = s.mode else {
                return Err(RecipeError::malformed(index, kind, "missing 'mode'"));
            };
            let source = state.source_ref(column, g);
            let expr = match mode {
                LetterCase::Upper => format!("UPPER({})", source),
                LetterCase::Lower => format!("LOWER({})", source),
                LetterCase::Title => g.title_case(&source),
            };
            state.set_transform(column, expr);
        }

        TransformStep::FillNull(s) => {
            let column = target_column(&s.column, index, kind)?;
            let source = state.source_ref(column, g);
            let test = if s.include_empty {
                format!("{src} IS NULL OR {src} = ''", src = source)
            } else {
                format!("{} IS NULL", source)
            };
            let expr = format!(
                "CASE WHEN {} THEN {} ELSE {} END",
                test,
                g.quote_value(&s.value),
                source
            );
            state.set_transform(column, expr);
        }
    }

    Ok(())
}

fn apply_join(
    state: &mut CompilationState,
    index: usize,
    step: &JoinStep,
    ctx: &StepContext<'_>,
) -> RecipeResult<()> {
    const KIND: &str = "join";
    let g = ctx.generator;

    let join_kind = validate_join_type(step.join_type.as_deref()).map_err(|e| e.at(index, KIND))?;
    let table = step.table.trim();
    if table.is_empty() {
        return Err(RecipeError::malformed(index, KIND, "missing 'table'"));
    }
    if join_kind != JoinKind::Cross && step.on.is_empty() {
        return Err(RecipeError::malformed(
            index,
            KIND,
            "requires at least one 'on' key pair",
        ));
    }

    let alias = match required(&step.alias) {
        Some(a) => a.to_string(),
        None => format!("j{}", state.joins.len() + 1),
    };
    let schema = required(&step.schema).unwrap_or(ctx.source_schema);

    let mut clause = format!(
        "{} {} AS {}",
        join_kind.sql_keyword(),
        table_ref(schema, table, g),
        g.quote_identifier(&alias)
    );

    if join_kind != JoinKind::Cross {
        let mut keys = Vec::with_capacity(step.on.len());
        for key in &step.on {
            let (left, right) = (key.left.trim(), key.right.trim());
            if left.is_empty() || right.is_empty() {
                return Err(RecipeError::malformed(
                    index,
                    KIND,
                    "join keys need both 'left' and 'right'",
                ));
            }
            let right = if right.contains('.') {
                g.quote_qualified(right)
            } else {
                format!("{}.{}", g.quote_identifier(&alias), g.quote_identifier(right))
            };
            keys.push(format!("{} = {}", qualify(left, g), right));
        }
        clause.push_str(" ON ");
        clause.push_str(&keys.join(" AND "));
    }
    state.joins.push(clause);

    // Extra columns only land on an explicit list.
    if let ColumnList::Explicit(list) = &mut state.columns {
        list.extend(
            non_empty(&step.select_columns)
                .into_iter()
                .map(|c| format!("{}.{}", alias, c)),
        );
    }

    Ok(())
}

/// Render one filter condition against an already-resolved column reference.
pub(crate) fn render_condition(
    column: &str,
    op: Operator,
    value: &Value,
    g: &dyn SqlGenerator,
) -> String {
    match op {
        _ if !op.needs_value() => format!("{} {}", column, op.sql_symbol()),
        Operator::In | Operator::NotIn => {
            let items = value.list_items();
            if items.is_empty() {
                // Empty IN matches nothing, empty NOT IN matches everything.
                let constant = if op == Operator::In { "1 = 0" } else { "1 = 1" };
                return constant.to_string();
            }
            let rendered: Vec<String> = items.iter().map(|v| g.quote_value(v)).collect();
            format!("{} {} ({})", column, op.sql_symbol(), rendered.join(", "))
        }
        Operator::Like | Operator::NotLike => {
            let pattern = match value {
                Value::Null => "NULL".to_string(),
                other => g.quote_string(&other.to_string()),
            };
            format!("{} {} {}", column, op.sql_symbol(), pattern)
        }
        _ => format!("{} {} {}", column, op.sql_symbol(), g.quote_value(value)),
    }
}

/// `<schema>.<table>` quoted, or just `<table>` when no schema is set.
pub(crate) fn table_ref(schema: &str, table: &str, g: &dyn SqlGenerator) -> String {
    if schema.trim().is_empty() {
        g.quote_identifier(table)
    } else {
        format!("{}.{}", g.quote_identifier(schema), g.quote_identifier(table))
    }
}

fn default_aggregate_alias(func: &AggregateFunc, column: &str) -> String {
    let func = func.to_string().to_lowercase().replace(' ', "_");
    if column == "*" {
        func
    } else {
        format!("{}_{}", func, column.replace('.', "_"))
    }
}

fn target_column<'a>(column: &'a str, index: usize, kind: &'static str) -> RecipeResult<&'a str> {
    let column = column.trim();
    if column.is_empty() {
        Err(RecipeError::malformed(index, kind, "missing 'column'"))
    } else {
        Ok(column)
    }
}

fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn non_empty(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

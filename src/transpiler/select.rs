//! SELECT SQL generation from a folded [`CompilationState`].

use crate::transpiler::state::{
    BASE_ALIAS, ColumnList, CompilationState, DedupMode, Pagination, qualify,
};
use crate::transpiler::steps::table_ref;
use crate::transpiler::traits::SqlGenerator;

/// The recipe's source relation.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub schema: &'a str,
    pub table: &'a str,
}

/// Generate the full statement, including UNION branches.
pub fn build_select(
    state: &CompilationState,
    generator: &dyn SqlGenerator,
    source: Source<'_>,
    pagination: Pagination,
    available_columns: Option<&[String]>,
) -> String {
    let head = select_head(state, generator);
    let columns = render_columns(state, generator, available_columns).join(", ");
    let where_clause = where_clause(state);

    let mut sql = format!(
        "{}{} FROM {} AS {}",
        head,
        columns,
        table_ref(source.schema, source.table, generator),
        BASE_ALIAS
    );

    for join in &state.joins {
        sql.push(' ');
        sql.push_str(join);
    }

    sql.push_str(&where_clause);

    // GROUP BY: explicit grouping wins, else dedup emulation
    let group_cols: Vec<String> = match (&state.grouping, &state.dedup) {
        (Some(grouping), _) => grouping
            .columns
            .iter()
            .map(|c| state.column_ref(c, generator))
            .collect(),
        (None, DedupMode::On(cols)) if !generator.supports_distinct_on() => {
            cols.iter().map(|c| state.column_ref(c, generator)).collect()
        }
        _ => Vec::new(),
    };
    if !group_cols.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&group_cols.join(", "));
    }

    // ORDER BY: DISTINCT ON needs its columns leading the sort.
    let order_by: Vec<String> = match &state.dedup {
        DedupMode::On(cols) if generator.supports_distinct_on() => {
            distinct_on_order(state, cols, generator)
        }
        _ => state.order_by.clone(),
    };
    if !order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_by.join(", "));
    }

    let pagination = state.pipeline_limit.unwrap_or(pagination);
    sql.push_str(&generator.limit_offset(pagination.limit, pagination.offset));

    if state.unions.is_empty() {
        return sql;
    }

    // Trailing ORDER BY / LIMIT would otherwise bind to the whole union.
    if !order_by.is_empty() || !pagination.is_empty() {
        sql = generator.union_operand(&sql);
    }
    for target in &state.unions {
        let op = if target.all { "UNION ALL" } else { "UNION" };
        sql.push_str(&format!(
            " {} {}{} FROM {} AS {}{}",
            op,
            head,
            columns,
            table_ref(&target.schema, &target.table, generator),
            BASE_ALIAS,
            where_clause
        ));
    }
    sql
}

fn select_head(state: &CompilationState, generator: &dyn SqlGenerator) -> String {
    match &state.dedup {
        DedupMode::All => String::from("SELECT DISTINCT "),
        DedupMode::On(cols) if generator.supports_distinct_on() => {
            let exprs: Vec<String> = cols.iter().map(|c| state.column_ref(c, generator)).collect();
            format!("SELECT DISTINCT ON ({}) ", exprs.join(", "))
        }
        _ => String::from("SELECT "),
    }
}

/// DISTINCT ON columns first (keeping a sort step's direction for them),
/// then the remaining sort terms.
fn distinct_on_order(
    state: &CompilationState,
    cols: &[String],
    generator: &dyn SqlGenerator,
) -> Vec<String> {
    let mut rest = state.order_by.clone();
    let mut order = Vec::with_capacity(cols.len() + rest.len());
    for col in cols {
        let reference = state.column_ref(col, generator);
        let prefix = format!("{} ", reference);
        match rest.iter().position(|term| term.starts_with(&prefix)) {
            Some(pos) => order.push(rest.remove(pos)),
            None => order.push(format!("{} ASC", reference)),
        }
    }
    order.extend(rest);
    order
}

fn where_clause(state: &CompilationState) -> String {
    if state.where_groups.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", state.where_groups.join(" AND "))
    }
}

/// Render the select list, then apply any `reorder` request.
pub fn render_columns(
    state: &CompilationState,
    generator: &dyn SqlGenerator,
    available_columns: Option<&[String]>,
) -> Vec<String> {
    let exprs = match &state.grouping {
        Some(grouping) => {
            let mut exprs: Vec<String> = grouping
                .columns
                .iter()
                .map(|c| match state.transform_for(c) {
                    Some(t) => format!(
                        "{} AS {}",
                        t.expression,
                        generator.quote_identifier(state.output_name(c))
                    ),
                    None => generator.quote_qualified(c),
                })
                .collect();
            for agg in &grouping.aggregations {
                let arg = if agg.column == "*" {
                    "*".to_string()
                } else {
                    state.column_ref(&agg.column, generator)
                };
                exprs.push(format!(
                    "{} AS {}",
                    agg.func.apply(&arg),
                    generator.quote_identifier(&agg.alias)
                ));
            }
            exprs
        }
        None => {
            let mut exprs: Vec<String> = match &state.columns {
                ColumnList::Explicit(list) => list
                    .iter()
                    .map(|c| render_column(state, c, generator))
                    .collect(),
                ColumnList::Wildcard if state.transformed.is_empty() => {
                    vec![format!("{}.*", BASE_ALIAS)]
                }
                ColumnList::Wildcard => match available_columns {
                    Some(known) => known
                        .iter()
                        .filter(|c| !state.dropped.contains(*c))
                        .map(|c| render_column(state, c, generator))
                        .collect(),
                    None => {
                        tracing::warn!(
                            transformed = state.transformed.len(),
                            "wildcard selection with transforms and no known columns; \
                             only transformed columns are emitted"
                        );
                        state
                            .transformed
                            .iter()
                            .map(|t| render_column(state, &t.column, generator))
                            .collect()
                    }
                },
            };
            for (expression, alias) in &state.added {
                exprs.push(format!("{} AS {}", expression, generator.quote_identifier(alias)));
            }
            exprs
        }
    };

    match &state.display_order {
        Some(order) => reorder(exprs, order),
        None => exprs,
    }
}

fn render_column(state: &CompilationState, column: &str, generator: &dyn SqlGenerator) -> String {
    if column.contains('.') {
        return generator.quote_qualified(column);
    }
    if let Some(t) = state.transform_for(column) {
        return format!(
            "{} AS {}",
            t.expression,
            generator.quote_identifier(state.output_name(column))
        );
    }
    match state.renames.get(column) {
        Some(alias) => format!(
            "{} AS {}",
            qualify(column, generator),
            generator.quote_identifier(alias)
        ),
        None => qualify(column, generator),
    }
}

/// Move expressions whose trailing identifier matches `order` to the front,
/// in that order. Unmatched names are ignored; the rest keep their order.
fn reorder(exprs: Vec<String>, order: &[String]) -> Vec<String> {
    let mut pending: Vec<Option<String>> = exprs.into_iter().map(Some).collect();
    let mut result = Vec::with_capacity(pending.len());

    for name in order {
        let found = pending.iter_mut().find(|slot| {
            slot.as_deref()
                .is_some_and(|expr| trailing_identifier(expr) == name.as_str())
        });
        if let Some(slot) = found {
            result.extend(slot.take());
        }
    }
    result.extend(pending.into_iter().flatten());
    result
}

/// Output name of a rendered select expression: the trailing quoted
/// identifier if there is one, else the text after the last ` AS ` or the
/// last dotted part.
pub(crate) fn trailing_identifier(expr: &str) -> String {
    let expr = expr.trim();
    for quote in ['"', '`'] {
        if let Some(name) = trailing_quoted(expr, quote) {
            return name;
        }
    }
    let tail = match expr.rfind(" AS ") {
        Some(pos) => &expr[pos + 4..],
        None => expr.rsplit('.').next().unwrap_or(expr),
    };
    tail.trim().to_string()
}

/// Unquoted content of the `quote`-delimited identifier ending `expr`.
fn trailing_quoted(expr: &str, quote: char) -> Option<String> {
    let bytes = expr.as_bytes();
    let q = quote as u8;
    if bytes.len() < 2 || bytes[bytes.len() - 1] != q {
        return None;
    }
    let close = bytes.len() - 1;
    let mut i = close;
    while i > 0 {
        i -= 1;
        if bytes[i] != q {
            continue;
        }
        // A doubled quote is an escaped quote inside the identifier.
        if i > 0 && bytes[i - 1] == q {
            i -= 1;
            continue;
        }
        let doubled = format!("{}{}", quote, quote);
        return Some(expr[i + 1..close].replace(&doubled, &quote.to_string()));
    }
    None
}

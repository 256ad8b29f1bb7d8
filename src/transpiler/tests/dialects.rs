//! Per-dialect rendering: quoting, DISTINCT ON emulation, pagination.

use pretty_assertions::assert_eq;

use super::{pg, sql, steps};
use crate::ast::*;
use crate::error::RecipeError;
use crate::transpiler::{Dialect, compile};

const DEDUP_EMAIL: &str = r#"[{"type": "deduplicate", "columns": ["email"]}]"#;

#[test]
fn test_postgres_distinct_on() {
    let out = compile(
        Dialect::Postgres,
        "users",
        "public",
        &steps(DEDUP_EMAIL),
        None,
        None,
        None,
    )
    .unwrap();
    assert_eq!(
        out,
        "SELECT DISTINCT ON (\"email\") t.* FROM \"public\".\"users\" AS t ORDER BY \"email\" ASC"
    );
}

#[test]
fn test_distinct_on_leads_existing_sort() {
    assert_eq!(
        pg(r#"[
            {"type": "sort", "columns": [
                {"column": "created_at", "direction": "desc"},
                {"column": "email", "direction": "desc"}
            ]},
            {"type": "deduplicate", "columns": ["email"]}
        ]"#),
        "SELECT DISTINCT ON (\"email\") t.* FROM \"public\".\"orders\" AS t ORDER BY \"email\" DESC, \"created_at\" DESC"
    );
}

#[test]
fn test_mysql_dedup_groups() {
    assert_eq!(
        sql(Dialect::MySQL, DEDUP_EMAIL).unwrap(),
        "SELECT t.* FROM `public`.`orders` AS t GROUP BY `email`"
    );
}

#[test]
fn test_sqlite_dedup_groups() {
    assert_eq!(
        sql(Dialect::SQLite, DEDUP_EMAIL).unwrap(),
        "SELECT t.* FROM \"public\".\"orders\" AS t GROUP BY \"email\""
    );
}

#[test]
fn test_dedup_all_rows() {
    let recipe = r#"[{"type": "deduplicate"}]"#;
    for dialect in [Dialect::Postgres, Dialect::MySQL, Dialect::SQLite] {
        let out = sql(dialect, recipe).unwrap();
        assert!(out.starts_with("SELECT DISTINCT t.* FROM "), "{dialect}: {out}");
    }
}

#[test]
fn test_bool_literals() {
    let recipe = r#"[{"type": "filter", "conditions": [
        {"column": "active", "operator": "eq", "value": true}
    ]}]"#;
    assert!(pg(recipe).ends_with("WHERE (\"active\" = TRUE)"));
    assert!(
        sql(Dialect::MySQL, recipe)
            .unwrap()
            .ends_with("WHERE (`active` = 1)")
    );
    assert!(
        sql(Dialect::SQLite, recipe)
            .unwrap()
            .ends_with("WHERE (\"active\" = 1)")
    );
}

#[test]
fn test_mysql_string_escaping() {
    let out = sql(
        Dialect::MySQL,
        r#"[{"type": "filter", "conditions": [
            {"column": "path", "operator": "eq", "value": "C:\\temp\\it's"}
        ]}]"#,
    )
    .unwrap();
    assert_eq!(
        out,
        r"SELECT t.* FROM `public`.`orders` AS t WHERE (`path` = 'C:\\temp\\it''s')"
    );
}

#[test]
fn test_pagination_per_dialect() {
    let paged = |dialect, limit, offset| {
        compile(dialect, "orders", "public", &[], limit, offset, None).unwrap()
    };
    let base = |d: Dialect| sql(d, "[]").unwrap();

    assert_eq!(
        paged(Dialect::Postgres, Some(10), Some(20)),
        format!("{} LIMIT 10 OFFSET 20", base(Dialect::Postgres))
    );
    assert_eq!(
        paged(Dialect::Postgres, None, Some(20)),
        format!("{} OFFSET 20", base(Dialect::Postgres))
    );
    assert_eq!(
        paged(Dialect::MySQL, Some(10), Some(20)),
        format!("{} LIMIT 20, 10", base(Dialect::MySQL))
    );
    assert_eq!(
        paged(Dialect::MySQL, None, Some(20)),
        format!("{} LIMIT 20, 18446744073709551615", base(Dialect::MySQL))
    );
    assert_eq!(
        paged(Dialect::SQLite, None, Some(20)),
        format!("{} LIMIT -1 OFFSET 20", base(Dialect::SQLite))
    );
    assert_eq!(
        paged(Dialect::SQLite, Some(10), Some(0)),
        format!("{} LIMIT 10", base(Dialect::SQLite))
    );
}

#[test]
fn test_title_case_per_dialect() {
    let recipe = r#"[
        {"type": "select", "columns": ["name"]},
        {"type": "case", "column": "name", "mode": "title"}
    ]"#;
    assert_eq!(
        pg(recipe),
        "SELECT INITCAP(t.\"name\") AS \"name\" FROM \"public\".\"orders\" AS t"
    );
    assert_eq!(
        sql(Dialect::MySQL, recipe).unwrap(),
        "SELECT CONCAT(UPPER(LEFT(t.`name`, 1)), LOWER(SUBSTRING(t.`name`, 2))) AS `name` FROM `public`.`orders` AS t"
    );
    assert_eq!(
        sql(Dialect::SQLite, recipe).unwrap(),
        "SELECT UPPER(SUBSTR(t.\"name\", 1, 1)) || LOWER(SUBSTR(t.\"name\", 2)) AS \"name\" FROM \"public\".\"orders\" AS t"
    );
}

#[test]
fn test_mysql_join_quoting() {
    assert_eq!(
        sql(
            Dialect::MySQL,
            r#"[{"type": "join", "table": "customers", "join_type": "inner",
                "on": [{"left": "customer_id", "right": "id"}]}]"#,
        )
        .unwrap(),
        "SELECT t.* FROM `public`.`orders` AS t INNER JOIN `public`.`customers` AS `j1` ON t.`customer_id` = `j1`.`id`"
    );
}

#[test]
fn test_backslash_cannot_reopen_string_literal() {
    let cases = [
        (Dialect::MySQL, r"'\'"),
        (Dialect::Postgres, r"E'\'' || '"),
    ];
    for (dialect, expression) in cases {
        let recipe = vec![
            TransformStep::AddColumn(AddColumnStep {
                name: Some("a".into()),
                expression: Some(expression.into()),
            }),
            TransformStep::Filter(FilterStep {
                logic: None,
                conditions: vec![FilterCondition {
                    column: "status".into(),
                    operator: Some("eq".into()),
                    value: Value::from(" AS x FROM mysql.user AS t -- "),
                }],
            }),
        ];
        let err = compile(dialect, "orders", "public", &recipe, None, None, None).unwrap_err();
        assert!(
            matches!(
                err,
                RecipeError::InvalidExpression {
                    index: 0,
                    step: "add_column",
                    ..
                }
            ),
            "{dialect}: {err:?}"
        );
    }
}

#[test]
fn test_sqlite_union_wraps_primary_as_subquery() {
    let recipe = steps(
        r#"[
        {"type": "sort", "columns": [{"column": "id"}]},
        {"type": "limit", "count": 5},
        {"type": "union", "table": "b"}
    ]"#,
    );
    assert_eq!(
        compile(Dialect::SQLite, "a", "main", &recipe, None, None, None).unwrap(),
        "SELECT * FROM (SELECT t.* FROM \"main\".\"a\" AS t ORDER BY \"id\" ASC LIMIT 5) AS t0 \
         UNION SELECT t.* FROM \"main\".\"b\" AS t"
    );
    assert_eq!(
        compile(Dialect::MySQL, "a", "main", &recipe, None, None, None).unwrap(),
        "(SELECT t.* FROM `main`.`a` AS t ORDER BY `id` ASC LIMIT 5) \
         UNION SELECT t.* FROM `main`.`b` AS t"
    );
}

#[test]
fn test_sqlite_plain_union_is_not_wrapped() {
    assert_eq!(
        sql(Dialect::SQLite, r#"[{"type": "union", "table": "orders_old", "all": true}]"#).unwrap(),
        "SELECT t.* FROM \"public\".\"orders\" AS t UNION ALL SELECT t.* FROM \"public\".\"orders_old\" AS t"
    );
}

use pretty_assertions::assert_eq;
use recipe_sql::prelude::*;

const ORDERS_REPORT: &str = r#"{
    "source_schema": "sales",
    "source_table": "orders",
    "steps": [
        {"type": "select", "columns": ["id", "customer_id", "status", "amount", "note"]},
        {"type": "drop_column", "columns": ["note"]},
        {"type": "rename", "mapping": {"amount": "total"}},
        {"type": "cast", "column": "amount", "data_type": "NUMERIC(12, 2)"},
        {"type": "case", "column": "status", "mode": "upper"},
        {"type": "filter", "conditions": [
            {"column": "status", "operator": "in", "value": ["PAID", "SHIPPED"]},
            {"column": "amount", "operator": "gte", "value": 10}
        ]},
        {"type": "join", "table": "customers", "alias": "c",
         "on": [{"left": "customer_id", "right": "id"}], "select_columns": ["email"]},
        {"type": "sort", "columns": [{"column": "id", "direction": "DESC"}]}
    ]
}"#;

#[test]
fn test_full_recipe_postgres() {
    let recipe = Recipe::from_json(ORDERS_REPORT).unwrap();
    assert_eq!(
        recipe.to_sql().unwrap(),
        "SELECT t.\"id\", t.\"customer_id\", UPPER(t.\"status\") AS \"status\", \
         CAST(t.\"amount\" AS NUMERIC(12, 2)) AS \"total\", \"c\".\"email\" \
         FROM \"sales\".\"orders\" AS t \
         LEFT JOIN \"sales\".\"customers\" AS \"c\" ON t.\"customer_id\" = \"c\".\"id\" \
         WHERE (UPPER(t.\"status\") IN ('PAID', 'SHIPPED') AND CAST(t.\"amount\" AS NUMERIC(12, 2)) >= 10) \
         ORDER BY \"id\" DESC"
    );
}

#[test]
fn test_full_recipe_mysql_paged() {
    let recipe = Recipe::from_json(ORDERS_REPORT).unwrap();
    let sql = recipe
        .to_sql_with(Dialect::MySQL, Some(25), Some(50), None)
        .unwrap();
    assert!(sql.starts_with("SELECT t.`id`, t.`customer_id`, UPPER(t.`status`) AS `status`"));
    assert!(sql.contains("LEFT JOIN `sales`.`customers` AS `c` ON t.`customer_id` = `c`.`id`"));
    assert!(sql.ends_with("ORDER BY `id` DESC LIMIT 50, 25"));
}

#[test]
fn test_count_query() {
    let recipe = Recipe::from_json(ORDERS_REPORT).unwrap();
    let inner = recipe.to_sql().unwrap();
    assert_eq!(
        recipe.to_count_sql(Dialect::Postgres).unwrap(),
        format!("SELECT COUNT(*) AS total FROM ({}) AS count_subquery", inner)
    );
}

#[test]
fn test_unknown_step_type_fails_decoding() {
    let err = Recipe::from_json(
        r#"{"source_table": "t", "steps": [{"type": "pivot", "columns": ["a"]}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, RecipeError::Json(_)));
}

#[test]
fn test_errors_name_failing_step() {
    let cases = [
        (
            r#"[{"type": "sort", "columns": [{"column": "a", "direction": "sideways"}]}]"#,
            "Step 0 (sort): invalid sort direction 'sideways'. Expected one of: ASC, DESC",
        ),
        (
            r#"[{"type": "select", "columns": ["a"]},
                {"type": "cast", "column": "a", "data_type": "INT; DROP TABLE x"}]"#,
            "Step 1 (cast): invalid expression",
        ),
        (
            r#"[{"type": "trim"}]"#,
            "Step 0 (trim) is malformed: missing 'column'",
        ),
    ];
    for (json, expected) in cases {
        let steps: Vec<TransformStep> = serde_json::from_str(json).unwrap();
        let err = compile(Dialect::Postgres, "orders", "public", &steps, None, None, None)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with(expected), "{message}");
    }
}

#[test]
fn test_expression_screening() {
    assert!(validate_expression("price * (1 - discount)").is_ok());
    assert!(validate_expression("ROUND(amount, 2)").is_ok());
    assert!(validate_expression("(SELECT max(id) FROM users)").is_err());
    assert!(validate_expression("amount /* sneaky */").is_err());
    assert!(validate_expression("pg_sleep(10)").is_err());
    assert!(validate_expression("'unterminated").is_err());
}

#[test]
fn test_compile_is_thread_safe_and_deterministic() {
    let recipe = std::sync::Arc::new(Recipe::from_json(ORDERS_REPORT).unwrap());
    let expected = recipe.to_sql().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let recipe = std::sync::Arc::clone(&recipe);
            std::thread::spawn(move || {
                (0..50)
                    .map(|_| recipe.to_sql().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for sql in handle.join().unwrap() {
            assert_eq!(sql, expected);
        }
    }
}

#[test]
fn test_config_drives_defaults() {
    let config = CompilerConfig::from_toml("dialect = \"sqlite\"\ndefault_limit = 20\n").unwrap();
    let recipe = Recipe::from_json(r#"{"source_table": "events"}"#).unwrap();
    let sql = recipe
        .to_sql_with(
            recipe.dialect_or(config.dialect),
            config.default_limit,
            None,
            None,
        )
        .unwrap();
    assert_eq!(sql, "SELECT t.* FROM \"public\".\"events\" AS t LIMIT 20");
}

//! Tests for SQL generation from condition trees.
//!
//! These run without a database: they assert on the SQL `sea-query`
//! renders, which is the delegate's entire contract besides execution.

use rust_decimal_macros::dec;
use sea_orm::sea_query::PostgresQueryBuilder;
use uuid::Uuid;

use sofra_core::report::{
    AggregateFunction, AggregateRequest, Comparison, Condition, RowQuery, Scalar, SortDirection,
};

use super::{aggregate_statement, count_statement, escape_like, rows_statement};

fn scoped_condition(branch_id: Uuid) -> Condition {
    Condition::All(vec![
        Condition::field("deleted_at", Comparison::IsNull),
        Condition::field("branch_id", Comparison::Eq(Scalar::Id(branch_id))),
    ])
}

#[test]
fn test_count_renders_filtered_count() {
    let sql = count_statement("transactions", &scoped_condition(Uuid::nil()))
        .to_string(PostgresQueryBuilder);

    assert!(sql.starts_with("SELECT COUNT(\"id\") AS \"row_count\" FROM \"transactions\""));
    assert!(sql.contains("\"deleted_at\" IS NULL"));
    assert!(sql.contains("\"branch_id\" ="));
}

#[test]
fn test_rows_statement_selects_orders_and_windows() {
    let query = RowQuery {
        condition: scoped_condition(Uuid::nil()),
        select: vec!["id".to_string(), "amount".to_string()],
        order_by: vec![
            ("transaction_date".to_string(), SortDirection::Desc),
            ("amount".to_string(), SortDirection::Asc),
        ],
        skip: Some(20),
        take: Some(10),
    };

    let sql = rows_statement("transactions", &query).to_string(PostgresQueryBuilder);

    assert!(sql.starts_with("SELECT \"id\", \"amount\" FROM \"transactions\""));
    assert!(sql.contains("ORDER BY \"transaction_date\" DESC, \"amount\" ASC"));
    assert!(sql.contains("LIMIT 10"));
    assert!(sql.contains("OFFSET 20"));
}

#[test]
fn test_unwindowed_query_has_no_limit() {
    let query = RowQuery {
        condition: Condition::match_all(),
        select: vec!["id".to_string()],
        order_by: vec![],
        skip: None,
        take: None,
    };

    let sql = rows_statement("branches", &query).to_string(PostgresQueryBuilder);

    assert!(!sql.contains("LIMIT"));
    assert!(!sql.contains("OFFSET"));
    assert!(!sql.contains("WHERE"));
}

#[test]
fn test_aggregate_statement_keys_results_by_alias() {
    let requests = vec![
        AggregateRequest {
            field: "amount".to_string(),
            function: AggregateFunction::Sum,
            alias: "total".to_string(),
        },
        AggregateRequest {
            field: "amount".to_string(),
            function: AggregateFunction::Avg,
            alias: "average".to_string(),
        },
        AggregateRequest {
            field: "id".to_string(),
            function: AggregateFunction::Count,
            alias: "entries".to_string(),
        },
    ];

    let sql = aggregate_statement("payables", &Condition::match_all(), &requests)
        .to_string(PostgresQueryBuilder);

    assert!(sql.contains("SUM(\"amount\") AS \"total\""));
    assert!(sql.contains("AVG(\"amount\") AS \"average\""));
    assert!(sql.contains("COUNT(\"id\") AS \"entries\""));
}

#[test]
fn test_comparison_operators_render() {
    let condition = Condition::All(vec![
        Condition::field("amount", Comparison::Gte(Scalar::Number(dec!(100)))),
        Condition::field(
            "amount",
            Comparison::Between(Scalar::Number(dec!(100)), Scalar::Number(dec!(200))),
        ),
        Condition::field(
            "status",
            Comparison::In(vec![
                Scalar::Text("open".to_string()),
                Scalar::Text("partial".to_string()),
            ]),
        ),
        Condition::field("notes", Comparison::IsNotNull),
    ]);

    let sql = count_statement("payables", &condition).to_string(PostgresQueryBuilder);

    assert!(sql.contains("\"amount\" >= 100"));
    assert!(sql.contains("\"amount\" BETWEEN 100 AND 200"));
    assert!(sql.contains("\"status\" IN ('open', 'partial')"));
    assert!(sql.contains("\"notes\" IS NOT NULL"));
}

#[test]
fn test_text_matching_renders_like_patterns() {
    let condition = Condition::All(vec![
        Condition::field("category", Comparison::Contains("rice".to_string())),
        Condition::field("invoice_no", Comparison::StartsWith("INV-".to_string())),
    ]);

    let sql = count_statement("transactions", &condition).to_string(PostgresQueryBuilder);

    assert!(sql.contains("LIKE '%rice%'"));
    assert!(sql.contains("LIKE 'INV-%'"));
}

#[test]
fn test_like_metacharacters_in_operands_are_escaped() {
    assert_eq!(escape_like("100%"), "100\\%");
    assert_eq!(escape_like("a_b"), "a\\_b");
    assert_eq!(escape_like("c\\d"), "c\\\\d");
}

#[test]
fn test_hostile_field_names_are_quoted_not_spliced() {
    let condition = Condition::All(vec![Condition::field(
        "amount\"; DROP TABLE transactions; --",
        Comparison::IsNull,
    )]);

    let sql = count_statement("transactions", &condition).to_string(PostgresQueryBuilder);

    // Identifier quoting doubles the embedded quote; nothing executable
    // escapes the identifier position.
    assert!(sql.contains("\"amount\"\"; DROP TABLE transactions; --\""));
}

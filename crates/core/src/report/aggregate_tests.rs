//! Tests for aggregate resolution and local grouping.

use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use super::{AggregateFunction, aggregate_requests, group_rows};
use crate::report::types::{ReportAggregation, ReportGroupBy, Row};

fn row(pairs: &[(&str, Value)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn group_by(fields: &[&str]) -> Vec<ReportGroupBy> {
    fields
        .iter()
        .map(|f| ReportGroupBy {
            field: (*f).to_string(),
        })
        .collect()
}

fn aggregation(field: &str, function: &str, alias: &str) -> ReportAggregation {
    ReportAggregation {
        field: field.to_string(),
        function: function.to_string(),
        alias: alias.to_string(),
    }
}

#[rstest]
#[case("sum", AggregateFunction::Sum)]
#[case("avg", AggregateFunction::Avg)]
#[case("count", AggregateFunction::Count)]
#[case("min", AggregateFunction::Min)]
#[case("max", AggregateFunction::Max)]
#[case("median", AggregateFunction::Sum)]
#[case("SUM", AggregateFunction::Sum)]
fn test_function_resolution(#[case] name: &str, #[case] expected: AggregateFunction) {
    assert_eq!(AggregateFunction::from_name(name), expected);
}

#[test]
fn test_buckets_match_delegate_result_keys() {
    assert_eq!(AggregateFunction::Sum.bucket(), "_sum");
    assert_eq!(AggregateFunction::Count.bucket(), "_count");
}

#[test]
fn test_requests_keep_configuration_order() {
    let requests = aggregate_requests(&[
        aggregation("amount", "sum", "total"),
        aggregation("amount", "avg", "average"),
    ]);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].alias, "total");
    assert_eq!(requests[1].function, AggregateFunction::Avg);
}

#[test]
fn test_groups_preserve_first_seen_order() {
    let rows = vec![
        row(&[("branch", json!("downtown")), ("amount", json!(10))]),
        row(&[("branch", json!("harbor")), ("amount", json!(20))]),
        row(&[("branch", json!("downtown")), ("amount", json!(30))]),
    ];

    let groups = group_rows(&rows, &group_by(&["branch"]), &[]);

    let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["downtown", "harbor"]);
    assert_eq!(groups[0].row_count, 2);
    assert_eq!(groups[1].row_count, 1);
}

#[test]
fn test_composite_key_joins_values_with_pipe() {
    let rows = vec![row(&[
        ("branch", json!("downtown")),
        ("status", json!("paid")),
    ])];

    let groups = group_rows(&rows, &group_by(&["branch", "status"]), &[]);

    assert_eq!(groups[0].key, "downtown|paid");
    assert_eq!(groups[0].group_values.get("status"), Some(&json!("paid")));
}

#[test]
fn test_null_and_missing_values_share_the_null_bucket() {
    let rows = vec![
        row(&[("category", Value::Null), ("amount", json!(5))]),
        row(&[("amount", json!(7))]),
        row(&[("category", json!("drinks")), ("amount", json!(9))]),
    ];

    let groups = group_rows(&rows, &group_by(&["category"]), &[]);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].key, "null");
    assert_eq!(groups[0].row_count, 2);
}

#[test]
fn test_group_aggregates_use_decimal_arithmetic() {
    let rows = vec![
        row(&[("branch", json!("downtown")), ("amount", json!("10.10"))]),
        row(&[("branch", json!("downtown")), ("amount", json!(20.15))]),
    ];
    let aggregations = vec![
        aggregation("amount", "sum", "total"),
        aggregation("amount", "avg", "average"),
        aggregation("amount", "min", "smallest"),
        aggregation("amount", "max", "largest"),
        aggregation("amount", "count", "entries"),
    ];

    let groups = group_rows(&rows, &group_by(&["branch"]), &aggregations);

    let agg = &groups[0].aggregations;
    assert_eq!(agg.get("total"), Some(&dec!(30.25)));
    assert_eq!(agg.get("average"), Some(&dec!(15.125)));
    assert_eq!(agg.get("smallest"), Some(&dec!(10.10)));
    assert_eq!(agg.get("largest"), Some(&dec!(20.15)));
    assert_eq!(agg.get("entries"), Some(&dec!(2)));
}

#[test]
fn test_non_numeric_partition_omits_alias_but_keeps_count() {
    let rows = vec![row(&[
        ("branch", json!("downtown")),
        ("notes", json!("cash only")),
    ])];
    let aggregations = vec![
        aggregation("notes", "sum", "total"),
        aggregation("missing_field", "count", "entries"),
    ];

    let groups = group_rows(&rows, &group_by(&["branch"]), &aggregations);

    let agg = &groups[0].aggregations;
    assert!(!agg.contains_key("total"));
    assert_eq!(agg.get("entries"), Some(&dec!(0)));
}

#[test]
fn test_count_skips_null_values() {
    let rows = vec![
        row(&[("branch", json!("downtown")), ("amount", json!(5))]),
        row(&[("branch", json!("downtown")), ("amount", Value::Null)]),
        row(&[("branch", json!("downtown"))]),
    ];
    let aggregations = vec![aggregation("amount", "count", "entries")];

    let groups = group_rows(&rows, &group_by(&["branch"]), &aggregations);

    assert_eq!(groups[0].aggregations.get("entries"), Some(&dec!(1)));
}

#[test]
fn test_empty_group_by_produces_single_partition() {
    let rows = vec![
        row(&[("amount", json!(1))]),
        row(&[("amount", json!(2))]),
    ];

    let groups = group_rows(&rows, &group_by(&[]), &[]);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "");
    assert_eq!(groups[0].row_count, 2);
}

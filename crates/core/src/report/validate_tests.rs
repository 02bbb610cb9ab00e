//! Tests for configuration validation.

use super::validate_configuration;
use crate::report::types::{
    ExportOptions, PaginationOptions, ReportAggregation, ReportConfiguration, ReportEntity,
    ReportField, ReportFilter, ReportSort,
};

fn field(source: &str, display: &str) -> ReportField {
    ReportField {
        source_field: source.to_string(),
        display_name: display.to_string(),
        visible: true,
        order: 0,
        width: None,
        format: None,
    }
}

fn base_config() -> ReportConfiguration {
    ReportConfiguration {
        entity: ReportEntity::Transactions,
        fields: vec![field("amount", "Amount")],
        filters: vec![],
        sorts: vec![],
        aggregations: vec![],
        group_by: vec![],
        pagination: PaginationOptions::default(),
        export: ExportOptions::default(),
    }
}

#[test]
fn test_valid_configuration_passes() {
    assert!(validate_configuration(&base_config()).is_ok());
}

#[test]
fn test_empty_fields_rejected() {
    let mut config = base_config();
    config.fields.clear();
    let err = validate_configuration(&config).unwrap_err();
    assert!(err.to_string().contains("at least one field"));
}

#[test]
fn test_field_missing_source_rejected() {
    let mut config = base_config();
    config.fields.push(field("", "Blank"));
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_field_missing_display_name_rejected() {
    let mut config = base_config();
    config.fields.push(field("amount", "  "));
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_filter_missing_field_rejected() {
    let mut config = base_config();
    config.filters.push(ReportFilter {
        field: String::new(),
        operator: "equals".to_string(),
        value: serde_json::Value::from(1),
    });
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_filter_missing_operator_rejected() {
    let mut config = base_config();
    config.filters.push(ReportFilter {
        field: "amount".to_string(),
        operator: String::new(),
        value: serde_json::Value::from(1),
    });
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_sort_missing_direction_rejected() {
    let mut config = base_config();
    config.sorts.push(ReportSort {
        field: "amount".to_string(),
        direction: String::new(),
    });
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_duplicate_aggregation_aliases_rejected() {
    let mut config = base_config();
    config.aggregations = vec![
        ReportAggregation {
            field: "amount".to_string(),
            function: "sum".to_string(),
            alias: "total".to_string(),
        },
        ReportAggregation {
            field: "amount".to_string(),
            function: "avg".to_string(),
            alias: "total".to_string(),
        },
    ];
    assert!(validate_configuration(&config).is_err());
}

#[test]
fn test_unknown_operator_is_not_a_validation_error() {
    // Unknown operators are dropped later by the condition builder.
    let mut config = base_config();
    config.filters.push(ReportFilter {
        field: "amount".to_string(),
        operator: "approximately".to_string(),
        value: serde_json::Value::from(10),
    });
    assert!(validate_configuration(&config).is_ok());
}

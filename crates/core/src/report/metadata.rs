//! Field metadata catalogs.
//!
//! Each entity has a built-in default catalog describing which fields
//! exist and what operations they support. A persisted catalog, when one
//! has been configured, takes precedence; the defaults guarantee the
//! engine can always describe every supported entity.

use serde::{Deserialize, Serialize};

use super::types::ReportEntity;

/// Field data types, used by clients to pick operators and formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldDataType {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// Calendar date or timestamp.
    Date,
    /// Boolean flag.
    Boolean,
    /// One of a fixed value set.
    Enum,
}

/// Metadata for one reportable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Storage field name.
    pub field_name: String,
    /// Human-readable label.
    pub display_name: String,
    /// Data type.
    pub data_type: FieldDataType,
    /// Usable in filters.
    pub filterable: bool,
    /// Usable in order clauses.
    pub sortable: bool,
    /// Usable in aggregations.
    pub aggregatable: bool,
    /// Usable as a grouping key.
    pub groupable: bool,
    /// Selected by default in new reports.
    pub default_visible: bool,
    /// Default column position.
    pub default_order: i32,
    /// Display format hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Fixed value set for enum fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// A selectable data source, for report builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// Stable entity value.
    pub value: String,
    /// Display label.
    pub label: String,
}

/// Lists every supported data source.
#[must_use]
pub fn data_sources() -> Vec<DataSource> {
    ReportEntity::ALL
        .into_iter()
        .map(|entity| DataSource {
            value: entity.as_str().to_string(),
            label: entity.label().to_string(),
        })
        .collect()
}

/// The built-in default catalog for an entity. Never empty.
#[must_use]
pub fn default_fields(entity: ReportEntity) -> Vec<FieldMetadata> {
    match entity {
        ReportEntity::Transactions => vec![
            date("transaction_date", "Date", 0),
            number("amount", "Amount", 1),
            enumerated(
                "transaction_type",
                "Type",
                2,
                &["sale", "expense", "refund"],
            ),
            enumerated("payment_method", "Payment Method", 3, &["cash", "card", "transfer"]),
            text("category", "Category", 4),
            text("description", "Description", 5),
            branch_column(6),
        ],
        ReportEntity::Payables => vec![
            text("supplier_name", "Supplier", 0),
            number("amount", "Amount", 1),
            number("paid_amount", "Paid", 2),
            date("due_date", "Due Date", 3),
            enumerated("status", "Status", 4, &["open", "partial", "settled", "overdue"]),
            branch_column(5),
        ],
        ReportEntity::Receivables => vec![
            text("customer_name", "Customer", 0),
            number("amount", "Amount", 1),
            number("collected_amount", "Collected", 2),
            date("due_date", "Due Date", 3),
            enumerated("status", "Status", 4, &["open", "partial", "settled", "overdue"]),
            branch_column(5),
        ],
        ReportEntity::Inventory => vec![
            text("item_name", "Item", 0),
            number("quantity", "Quantity", 1),
            text("unit", "Unit", 2),
            number("unit_cost", "Unit Cost", 3),
            number("total_value", "Total Value", 4),
            date("last_restocked_at", "Last Restocked", 5),
            branch_column(6),
        ],
        ReportEntity::Salaries => vec![
            text("employee_name", "Employee", 0),
            number("base_amount", "Base Salary", 1),
            number("deductions", "Deductions", 2),
            number("net_amount", "Net Salary", 3),
            date("period_month", "Period", 4),
            enumerated("status", "Status", 5, &["pending", "paid"]),
            branch_column(6),
        ],
        ReportEntity::Branches => vec![
            text("name", "Branch Name", 0),
            text("address", "Address", 1),
            text("phone", "Phone", 2),
            boolean("is_active", "Active", 3),
            date("opened_at", "Opened", 4),
        ],
    }
}

fn field(
    name: &str,
    display: &str,
    data_type: FieldDataType,
    order: i32,
    aggregatable: bool,
) -> FieldMetadata {
    FieldMetadata {
        field_name: name.to_string(),
        display_name: display.to_string(),
        data_type,
        filterable: true,
        sortable: true,
        aggregatable,
        groupable: !aggregatable,
        default_visible: true,
        default_order: order,
        format: None,
        enum_values: None,
    }
}

fn text(name: &str, display: &str, order: i32) -> FieldMetadata {
    field(name, display, FieldDataType::Text, order, false)
}

fn number(name: &str, display: &str, order: i32) -> FieldMetadata {
    let mut meta = field(name, display, FieldDataType::Number, order, true);
    meta.format = Some("currency".to_string());
    meta
}

fn date(name: &str, display: &str, order: i32) -> FieldMetadata {
    field(name, display, FieldDataType::Date, order, false)
}

fn boolean(name: &str, display: &str, order: i32) -> FieldMetadata {
    field(name, display, FieldDataType::Boolean, order, false)
}

fn enumerated(name: &str, display: &str, order: i32, values: &[&str]) -> FieldMetadata {
    let mut meta = field(name, display, FieldDataType::Enum, order, false);
    meta.enum_values = Some(values.iter().map(ToString::to_string).collect());
    meta
}

fn branch_column(order: i32) -> FieldMetadata {
    let mut meta = field("branch_id", "Branch", FieldDataType::Text, order, false);
    meta.default_visible = false;
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_has_a_default_catalog() {
        for entity in ReportEntity::ALL {
            let fields = default_fields(entity);
            assert!(!fields.is_empty(), "{entity:?} catalog must not be empty");
        }
    }

    #[test]
    fn test_branch_scoped_entities_expose_branch_column() {
        for entity in ReportEntity::ALL {
            let has_branch = default_fields(entity)
                .iter()
                .any(|f| f.field_name == "branch_id");
            assert_eq!(has_branch, entity.branch_scoped());
        }
    }

    #[test]
    fn test_data_sources_cover_all_entities() {
        let sources = data_sources();
        assert_eq!(sources.len(), ReportEntity::ALL.len());
        assert!(sources.iter().any(|s| s.value == "transactions"));
        assert!(sources.iter().any(|s| s.label == "Branches"));
    }

    #[test]
    fn test_number_fields_are_aggregatable() {
        let fields = default_fields(ReportEntity::Payables);
        let amount = fields.iter().find(|f| f.field_name == "amount").unwrap();
        assert!(amount.aggregatable);
        assert_eq!(amount.data_type, FieldDataType::Number);
    }
}

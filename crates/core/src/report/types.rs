//! Report configuration and result types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A fetched row: column name to JSON value, in select order.
pub type Row = Map<String, Value>;

/// Business entities a report can read.
///
/// Adding an entity means adding field metadata and registering a storage
/// delegate; the engine itself carries no entity-specific logic beyond
/// this dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportEntity {
    /// Sales and expense transactions.
    Transactions,
    /// Supplier payables.
    Payables,
    /// Customer receivables.
    Receivables,
    /// Inventory items.
    Inventory,
    /// Employee salary records.
    Salaries,
    /// Restaurant branches.
    Branches,
}

impl ReportEntity {
    /// All supported entities, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::Transactions,
        Self::Payables,
        Self::Receivables,
        Self::Inventory,
        Self::Salaries,
        Self::Branches,
    ];

    /// Stable string form used in stored configurations and URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Payables => "payables",
            Self::Receivables => "receivables",
            Self::Inventory => "inventory",
            Self::Salaries => "salaries",
            Self::Branches => "branches",
        }
    }

    /// Parses the stable string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == value)
    }

    /// Human-readable label for data source listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transactions => "Transactions",
            Self::Payables => "Payables",
            Self::Receivables => "Receivables",
            Self::Inventory => "Inventory",
            Self::Salaries => "Salaries",
            Self::Branches => "Branches",
        }
    }

    /// Whether rows of this entity carry a soft-delete marker.
    ///
    /// Branches are never soft-deleted; every other entity is.
    #[must_use]
    pub const fn soft_deletable(self) -> bool {
        !matches!(self, Self::Branches)
    }

    /// Whether rows of this entity belong to a branch.
    ///
    /// Branch-scoped users only ever see their own branch's rows of
    /// these entities.
    #[must_use]
    pub const fn branch_scoped(self) -> bool {
        !matches!(self, Self::Branches)
    }
}

/// Column selection for a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportField {
    /// Storage field this column reads from.
    pub source_field: String,
    /// Column heading shown in results and exports.
    pub display_name: String,
    /// Whether the column appears in results.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Position among selected columns; also export column order.
    #[serde(default)]
    pub order: i32,
    /// Export column width hint.
    #[serde(default)]
    pub width: Option<u32>,
    /// Display format hint (currency, date style); applied by consumers.
    #[serde(default)]
    pub format: Option<String>,
}

const fn default_visible() -> bool {
    true
}

/// A single filter clause.
///
/// `operator` is kept as text: configurations are persisted and may carry
/// operators this build does not know, which are dropped with a warning
/// rather than failing the whole report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFilter {
    /// Field to filter on.
    pub field: String,
    /// Operator name (equals, contains, between, isNull, ...).
    pub operator: String,
    /// Operand; shape depends on the operator category.
    #[serde(default)]
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Parses a direction string, defaulting to ascending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// An order clause. Clause order is preserved: the first clause is the
/// primary sort key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSort {
    /// Field to sort by.
    pub field: String,
    /// `asc` or `desc`.
    pub direction: String,
}

/// An aggregation request over the filtered population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAggregation {
    /// Field to aggregate.
    pub field: String,
    /// Function name (sum, avg, count, min, max); unknown names behave
    /// as sum.
    pub function: String,
    /// Result key; unique within one configuration.
    pub alias: String,
}

/// A grouping key applied to the fetched row set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportGroupBy {
    /// Field to group by.
    pub field: String,
}

/// Pagination options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
    /// Whether pagination applies to the row fetch.
    #[serde(default)]
    pub enabled: bool,
    /// Page number, 1-indexed.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    20
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// Export options carried inside a configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Requested file name; sanitized before use.
    #[serde(default)]
    pub file_name: Option<String>,
}

/// A complete declarative report description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfiguration {
    /// Entity the report reads.
    pub entity: ReportEntity,
    /// Columns to select.
    pub fields: Vec<ReportField>,
    /// Filter clauses, combined with logical AND.
    #[serde(default)]
    pub filters: Vec<ReportFilter>,
    /// Order clauses, primary key first.
    #[serde(default)]
    pub sorts: Vec<ReportSort>,
    /// Aggregations over the full filtered population.
    #[serde(default)]
    pub aggregations: Vec<ReportAggregation>,
    /// Grouping keys applied to the fetched rows.
    #[serde(default)]
    pub group_by: Vec<ReportGroupBy>,
    /// Pagination options.
    #[serde(default)]
    pub pagination: PaginationOptions,
    /// Export options.
    #[serde(default)]
    pub export: ExportOptions,
}

impl ReportConfiguration {
    /// Visible fields sorted by configured order.
    ///
    /// This is both the select list (plus `id`) and the export column
    /// order.
    #[must_use]
    pub fn visible_fields(&self) -> Vec<&ReportField> {
        let mut fields: Vec<&ReportField> = self.fields.iter().filter(|f| f.visible).collect();
        fields.sort_by_key(|f| f.order);
        fields
    }
}

/// Caller role as seen by the reporting engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportRole {
    /// Sees all branches.
    Admin,
    /// Restricted to an assigned branch.
    Branch,
}

impl ReportRole {
    /// Whether this role bypasses branch scoping.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Authorization context supplied by the authentication boundary.
///
/// The engine never authenticates; it only scopes queries with the
/// context it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUserContext {
    /// Requesting user.
    pub user_id: Uuid,
    /// Caller role.
    pub role: ReportRole,
    /// Assigned branch for branch-scoped roles.
    #[serde(default)]
    pub branch_id: Option<Uuid>,
}

/// A grouped partition of the fetched rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowGroup {
    /// String-joined tuple of group-by values (nulls as `"null"`).
    pub key: String,
    /// Group-by field values for this partition.
    pub group_values: Map<String, Value>,
    /// Number of rows in the partition.
    pub row_count: u64,
    /// Locally recomputed aggregations by alias. Aliases with no numeric
    /// values in the partition are absent (except count, which is zero).
    pub aggregations: BTreeMap<String, Decimal>,
}

/// The result of one query execution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Fetched rows, reshaped to `id` plus the visible fields in order.
    pub rows: Vec<Row>,
    /// Total matching rows, independent of pagination.
    pub total_count: u64,
    /// Storage-level aggregates over the *full* filtered population.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Map<String, Value>>,
    /// Grouped view of the fetched rows. Local group aggregates cover
    /// only the fetched page and can differ from `aggregations`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouped_rows: Option<Vec<RowGroup>>,
    /// End-to-end execution time.
    pub execution_time_ms: u64,
}

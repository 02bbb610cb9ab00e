//! Storage-neutral condition trees.
//!
//! Filters, soft-delete exclusion, and branch scoping are all expressed
//! as one conjunction that every storage delegate translates into its own
//! query primitives. Row-level security lives here, inside the query,
//! not at the presentation layer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::error::ReportError;
use super::types::{ReportEntity, ReportFilter, ReportUserContext};

/// Soft-delete marker column on soft-deletable entities.
pub const SOFT_DELETE_FIELD: &str = "deleted_at";

/// Branch reference column on branch-scoped entities.
pub const BRANCH_FIELD: &str = "branch_id";

/// A typed scalar operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(Decimal),
    /// Boolean value.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Entity reference.
    Id(Uuid),
}

/// A comparison applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Equal to.
    Eq(Scalar),
    /// Not equal to.
    Ne(Scalar),
    /// Greater than.
    Gt(Scalar),
    /// Greater than or equal.
    Gte(Scalar),
    /// Less than.
    Lt(Scalar),
    /// Less than or equal.
    Lte(Scalar),
    /// Substring match.
    Contains(String),
    /// Prefix match.
    StartsWith(String),
    /// Suffix match.
    EndsWith(String),
    /// Membership in a set.
    In(Vec<Scalar>),
    /// Exclusion from a set.
    NotIn(Vec<Scalar>),
    /// Inclusive range.
    Between(Scalar, Scalar),
    /// Field is null.
    IsNull,
    /// Field is not null.
    IsNotNull,
}

/// A condition tree. Sub-conditions combine with logical AND; an empty
/// conjunction matches all rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Conjunction of sub-conditions.
    All(Vec<Condition>),
    /// A single field comparison.
    Field {
        /// Field the comparison applies to.
        field: String,
        /// The comparison.
        comparison: Comparison,
    },
}

impl Condition {
    /// The empty conjunction: matches every row.
    #[must_use]
    pub const fn match_all() -> Self {
        Self::All(Vec::new())
    }

    /// Builds a single-field condition.
    #[must_use]
    pub fn field(field: impl Into<String>, comparison: Comparison) -> Self {
        Self::Field {
            field: field.into(),
            comparison,
        }
    }

    /// Whether this tree constrains the given field anywhere.
    #[must_use]
    pub fn constrains(&self, name: &str) -> bool {
        match self {
            Self::All(children) => children.iter().any(|c| c.constrains(name)),
            Self::Field { field, .. } => field == name,
        }
    }
}

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// `equals`
    Equals,
    /// `notEquals`
    NotEquals,
    /// `greaterThan`
    GreaterThan,
    /// `greaterThanOrEqual`
    GreaterThanOrEqual,
    /// `lessThan`
    LessThan,
    /// `lessThanOrEqual`
    LessThanOrEqual,
    /// `contains`
    Contains,
    /// `startsWith`
    StartsWith,
    /// `endsWith`
    EndsWith,
    /// `in`
    In,
    /// `notIn`
    NotIn,
    /// `between`
    Between,
    /// `isNull`
    IsNull,
    /// `isNotNull`
    IsNotNull,
}

impl FilterOperator {
    /// Parses an operator name; `None` for anything outside the closed
    /// set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "greaterThan" => Self::GreaterThan,
            "greaterThanOrEqual" => Self::GreaterThanOrEqual,
            "lessThan" => Self::LessThan,
            "lessThanOrEqual" => Self::LessThanOrEqual,
            "contains" => Self::Contains,
            "startsWith" => Self::StartsWith,
            "endsWith" => Self::EndsWith,
            "in" => Self::In,
            "notIn" => Self::NotIn,
            "between" => Self::Between,
            "isNull" => Self::IsNull,
            "isNotNull" => Self::IsNotNull,
            _ => return None,
        })
    }
}

/// Builds the condition tree for one query: soft-delete exclusion, branch
/// scoping, then one condition per recognized filter, all ANDed.
///
/// Branch scoping always uses the *requester's* branch, never a
/// caller-supplied value; caller filters on the branch field only ever
/// narrow the result further.
///
/// # Errors
///
/// Returns [`ReportError::BranchRequired`] when a branch-scoped user with
/// no assigned branch queries a branch-scoped entity.
pub fn build_conditions(
    entity: ReportEntity,
    filters: &[ReportFilter],
    user: &ReportUserContext,
) -> Result<Condition, ReportError> {
    let mut conditions = Vec::new();

    if entity.soft_deletable() {
        conditions.push(Condition::field(SOFT_DELETE_FIELD, Comparison::IsNull));
    }

    if !user.role.is_admin() && entity.branch_scoped() {
        let branch_id = user.branch_id.ok_or(ReportError::BranchRequired)?;
        conditions.push(Condition::field(
            BRANCH_FIELD,
            Comparison::Eq(Scalar::Id(branch_id)),
        ));
    }

    for filter in filters {
        if let Some(condition) = filter_condition(filter) {
            conditions.push(condition);
        }
    }

    Ok(Condition::All(conditions))
}

/// Translates one filter into a condition, or drops it.
///
/// Unknown operators and malformed operand shapes are logged and skipped;
/// a bad filter never aborts the query.
fn filter_condition(filter: &ReportFilter) -> Option<Condition> {
    let Some(operator) = FilterOperator::parse(&filter.operator) else {
        warn!(
            field = %filter.field,
            operator = %filter.operator,
            "unknown filter operator, dropping filter"
        );
        return None;
    };

    let comparison = match operator {
        FilterOperator::Equals => Comparison::Eq(scalar_operand(filter)?),
        FilterOperator::NotEquals => Comparison::Ne(scalar_operand(filter)?),
        FilterOperator::GreaterThan => Comparison::Gt(scalar_operand(filter)?),
        FilterOperator::GreaterThanOrEqual => Comparison::Gte(scalar_operand(filter)?),
        FilterOperator::LessThan => Comparison::Lt(scalar_operand(filter)?),
        FilterOperator::LessThanOrEqual => Comparison::Lte(scalar_operand(filter)?),
        FilterOperator::Contains => Comparison::Contains(text_operand(filter)?),
        FilterOperator::StartsWith => Comparison::StartsWith(text_operand(filter)?),
        FilterOperator::EndsWith => Comparison::EndsWith(text_operand(filter)?),
        FilterOperator::In => Comparison::In(list_operand(filter)?),
        FilterOperator::NotIn => Comparison::NotIn(list_operand(filter)?),
        FilterOperator::Between => {
            let (low, high) = range_operand(filter)?;
            Comparison::Between(low, high)
        }
        FilterOperator::IsNull => Comparison::IsNull,
        FilterOperator::IsNotNull => Comparison::IsNotNull,
    };

    Some(Condition::field(filter.field.clone(), comparison))
}

fn scalar_operand(filter: &ReportFilter) -> Option<Scalar> {
    let scalar = coerce_scalar(&filter.value);
    if scalar.is_none() {
        warn!(
            field = %filter.field,
            operator = %filter.operator,
            "filter value is not a scalar, dropping filter"
        );
    }
    scalar
}

fn text_operand(filter: &ReportFilter) -> Option<String> {
    match &filter.value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => {
            warn!(
                field = %filter.field,
                operator = %filter.operator,
                "filter value is not text, dropping filter"
            );
            None
        }
    }
}

fn list_operand(filter: &ReportFilter) -> Option<Vec<Scalar>> {
    let Value::Array(values) = &filter.value else {
        warn!(
            field = %filter.field,
            operator = %filter.operator,
            "filter value is not an array, dropping filter"
        );
        return None;
    };
    Some(values.iter().filter_map(coerce_scalar).collect())
}

fn range_operand(filter: &ReportFilter) -> Option<(Scalar, Scalar)> {
    if let Value::Array(values) = &filter.value
        && values.len() == 2
        && let Some(low) = coerce_scalar(&values[0])
        && let Some(high) = coerce_scalar(&values[1])
    {
        return Some((low, high));
    }
    warn!(
        field = %filter.field,
        operator = %filter.operator,
        "between filter requires a [min, max] pair, dropping filter"
    );
    None
}

/// Coerces a JSON value to a typed scalar.
///
/// String values are opportunistically parsed: a leading `YYYY-MM-DD`
/// becomes a date, a UUID becomes an id, a fully numeric string becomes a
/// number, `"true"`/`"false"` become booleans, anything else stays text.
/// This lets callers send every filter value as text.
#[must_use]
pub fn coerce_scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(coerce_text(s)),
        Value::Number(n) => n.to_string().parse::<Decimal>().ok().map(Scalar::Number),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_text(text: &str) -> Scalar {
    if looks_like_date(text)
        && let Some(prefix) = text.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Scalar::Date(date);
    }
    if let Ok(id) = Uuid::parse_str(text) {
        return Scalar::Id(id);
    }
    if let Ok(number) = text.parse::<Decimal>()
        && !text.is_empty()
    {
        return Scalar::Number(number);
    }
    match text {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Text(text.to_string()),
    }
}

fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod tests;

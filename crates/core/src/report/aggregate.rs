//! Aggregation requests and local grouping.
//!
//! Storage delegates compute aggregates over the full filtered
//! population; this module also recomputes them locally per group over
//! the fetched rows. All numeric work uses [`Decimal`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::warn;

use super::types::{ReportAggregation, ReportGroupBy, Row, RowGroup};

/// Sentinel used for null values inside group keys.
const NULL_KEY: &str = "null";

/// The closed set of aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    /// Sum of numeric values.
    Sum,
    /// Arithmetic mean of numeric values.
    Avg,
    /// Count of non-null values.
    Count,
    /// Smallest numeric value.
    Min,
    /// Largest numeric value.
    Max,
}

impl AggregateFunction {
    /// Resolves a function name. Unknown names are logged and treated as
    /// sum, so a stale stored configuration still produces a report.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            "count" => Self::Count,
            "min" => Self::Min,
            "max" => Self::Max,
            other => {
                warn!(function = %other, "unknown aggregate function, using sum");
                Self::Sum
            }
        }
    }

    /// Result-key suffix used when a delegate reports this aggregate.
    #[must_use]
    pub const fn bucket(self) -> &'static str {
        match self {
            Self::Sum => "_sum",
            Self::Avg => "_avg",
            Self::Count => "_count",
            Self::Min => "_min",
            Self::Max => "_max",
        }
    }
}

/// A resolved aggregation, ready for a storage delegate.
#[derive(Debug, Clone)]
pub struct AggregateRequest {
    /// Field to aggregate.
    pub field: String,
    /// Resolved function.
    pub function: AggregateFunction,
    /// Result key.
    pub alias: String,
}

/// Resolves configured aggregations into delegate requests.
#[must_use]
pub fn aggregate_requests(aggregations: &[ReportAggregation]) -> Vec<AggregateRequest> {
    aggregations
        .iter()
        .map(|a| AggregateRequest {
            field: a.field.clone(),
            function: AggregateFunction::from_name(&a.function),
            alias: a.alias.clone(),
        })
        .collect()
}

/// Partitions fetched rows by the group-by fields, preserving first-seen
/// order, and recomputes each aggregation locally per partition.
///
/// Local aggregation is numeric-only: values that do not parse as numbers
/// are ignored. An alias with no numeric values in a partition is absent
/// from that partition's result, except count which is always present.
#[must_use]
pub fn group_rows(
    rows: &[Row],
    group_by: &[ReportGroupBy],
    aggregations: &[ReportAggregation],
) -> Vec<RowGroup> {
    let requests = aggregate_requests(aggregations);
    let mut order: Vec<String> = Vec::new();
    let mut partitions: BTreeMap<String, Vec<&Row>> = BTreeMap::new();

    for row in rows {
        let key = group_key(row, group_by);
        if !partitions.contains_key(&key) {
            order.push(key.clone());
        }
        partitions.entry(key).or_default().push(row);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let members = partitions.remove(&key)?;
            let group_values = group_values(members.first().copied(), group_by);
            let aggregations = partition_aggregates(&members, &requests);
            Some(RowGroup {
                key,
                group_values,
                row_count: members.len() as u64,
                aggregations,
            })
        })
        .collect()
}

fn group_key(row: &Row, group_by: &[ReportGroupBy]) -> String {
    group_by
        .iter()
        .map(|g| key_part(row.get(&g.field)))
        .collect::<Vec<_>>()
        .join("|")
}

fn key_part(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NULL_KEY.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn group_values(first: Option<&Row>, group_by: &[ReportGroupBy]) -> Map<String, Value> {
    let mut values = Map::new();
    for g in group_by {
        let value = first
            .and_then(|row| row.get(&g.field))
            .cloned()
            .unwrap_or(Value::Null);
        values.insert(g.field.clone(), value);
    }
    values
}

fn partition_aggregates(
    members: &[&Row],
    requests: &[AggregateRequest],
) -> BTreeMap<String, Decimal> {
    let mut results = BTreeMap::new();
    for request in requests {
        if let Some(value) = partition_aggregate(members, request) {
            results.insert(request.alias.clone(), value);
        }
    }
    results
}

fn partition_aggregate(members: &[&Row], request: &AggregateRequest) -> Option<Decimal> {
    if request.function == AggregateFunction::Count {
        let count = members
            .iter()
            .filter(|row| !matches!(row.get(&request.field), None | Some(Value::Null)))
            .count();
        return Some(Decimal::from(count as u64));
    }

    let values: Vec<Decimal> = members
        .iter()
        .filter_map(|row| row.get(&request.field).and_then(numeric_value))
        .collect();
    if values.is_empty() {
        return None;
    }

    match request.function {
        AggregateFunction::Sum => Some(values.iter().copied().sum()),
        AggregateFunction::Avg => {
            let total: Decimal = values.iter().copied().sum();
            total.checked_div(Decimal::from(values.len() as u64))
        }
        AggregateFunction::Min => values.iter().copied().min(),
        AggregateFunction::Max => values.iter().copied().max(),
        AggregateFunction::Count => None,
    }
}

/// Reads a JSON value as a decimal. Delegates may return numerics as JSON
/// numbers or as strings, depending on the backing column type.
fn numeric_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;

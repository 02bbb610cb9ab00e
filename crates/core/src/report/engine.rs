//! Report engine: orchestration over storage delegates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::aggregate::{AggregateRequest, aggregate_requests, group_rows};
use super::conditions::{Condition, build_conditions};
use super::error::ReportError;
use super::types::{
    QueryResult, ReportConfiguration, ReportEntity, ReportUserContext, Row, SortDirection,
};
use super::validate::validate_configuration;

/// Primary-key column present on every entity and always selected.
const ID_FIELD: &str = "id";

/// One row fetch, fully described: condition tree, select list, order
/// clauses, and an optional window.
#[derive(Debug, Clone)]
pub struct RowQuery {
    /// Condition tree with row-level security already applied.
    pub condition: Condition,
    /// Columns to select, in result order.
    pub select: Vec<String>,
    /// Order clauses, primary key first.
    pub order_by: Vec<(String, SortDirection)>,
    /// Rows to skip.
    pub skip: Option<u64>,
    /// Maximum rows to return.
    pub take: Option<u64>,
}

/// Narrow storage seam the engine drives.
///
/// A delegate translates condition trees into its own query primitives.
/// It never sees the caller's identity; scoping is already inside the
/// condition.
#[async_trait]
pub trait StorageDelegate: Send + Sync {
    /// Counts rows matching the condition.
    async fn count(&self, condition: &Condition) -> Result<u64, ReportError>;

    /// Fetches rows for the query.
    async fn find_many(&self, query: &RowQuery) -> Result<Vec<Row>, ReportError>;

    /// Computes aggregates over all rows matching the condition, keyed by
    /// request alias.
    async fn aggregate(
        &self,
        condition: &Condition,
        requests: &[AggregateRequest],
    ) -> Result<Map<String, Value>, ReportError>;
}

/// Executes declarative report configurations against registered
/// delegates.
pub struct ReportEngine {
    delegates: HashMap<ReportEntity, Arc<dyn StorageDelegate>>,
}

impl ReportEngine {
    /// Creates an engine with no registered delegates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            delegates: HashMap::new(),
        }
    }

    /// Registers the delegate for one entity, replacing any previous one.
    pub fn register(&mut self, entity: ReportEntity, delegate: Arc<dyn StorageDelegate>) {
        self.delegates.insert(entity, delegate);
    }

    /// Runs one report: validate, scope, fetch rows and count and
    /// aggregates concurrently, then shape the result.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidConfiguration`] for a structurally
    /// invalid configuration, [`ReportError::UnknownEntity`] when no
    /// delegate is registered for the entity,
    /// [`ReportError::BranchRequired`] for an unassigned branch-scoped
    /// user, and [`ReportError::Storage`] for delegate failures.
    #[instrument(skip_all, fields(entity = %config.entity.as_str(), user_id = %user.user_id))]
    pub async fn execute_query(
        &self,
        config: &ReportConfiguration,
        user: &ReportUserContext,
    ) -> Result<QueryResult, ReportError> {
        let started = Instant::now();

        validate_configuration(config)?;
        let delegate = self
            .delegates
            .get(&config.entity)
            .ok_or_else(|| ReportError::UnknownEntity(config.entity.as_str().to_string()))?;

        let condition = build_conditions(config.entity, &config.filters, user)?;
        let query = row_query(config, condition.clone());
        let requests = aggregate_requests(&config.aggregations);

        let (total_count, raw_rows, aggregations) = tokio::try_join!(
            delegate.count(&condition),
            delegate.find_many(&query),
            async {
                if requests.is_empty() {
                    Ok(None)
                } else {
                    delegate.aggregate(&condition, &requests).await.map(Some)
                }
            },
        )?;

        let rows: Vec<Row> = raw_rows.iter().map(|r| shape_row(r, &query.select)).collect();
        let grouped_rows = (!config.group_by.is_empty())
            .then(|| group_rows(&rows, &config.group_by, &config.aggregations));

        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            rows = rows.len(),
            total_count, execution_time_ms, "report query executed"
        );

        Ok(QueryResult {
            rows,
            total_count,
            aggregations,
            grouped_rows,
            execution_time_ms,
        })
    }
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the row fetch from a configuration and scoped condition.
fn row_query(config: &ReportConfiguration, condition: Condition) -> RowQuery {
    let mut select = vec![ID_FIELD.to_string()];
    for field in config.visible_fields() {
        if field.source_field != ID_FIELD && !select.contains(&field.source_field) {
            select.push(field.source_field.clone());
        }
    }

    let order_by = config
        .sorts
        .iter()
        .map(|s| (s.field.clone(), SortDirection::parse(&s.direction)))
        .collect();

    let (skip, take) = if config.pagination.enabled {
        let page = config.pagination.page.max(1);
        let size = config.pagination.page_size.max(1);
        (Some(page.saturating_sub(1).saturating_mul(size)), Some(size))
    } else {
        (None, None)
    };

    RowQuery {
        condition,
        select,
        order_by,
        skip,
        take,
    }
}

/// Reshapes a fetched row to exactly the select list, in select order.
/// Columns the delegate did not return come back as null.
fn shape_row(row: &Row, select: &[String]) -> Row {
    select
        .iter()
        .map(|column| {
            let value = row.get(column).cloned().unwrap_or(Value::Null);
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

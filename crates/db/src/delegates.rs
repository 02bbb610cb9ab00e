//! SQL storage delegates.
//!
//! One [`SqlDelegate`] per entity table translates the engine's
//! storage-neutral condition trees into parameterized Postgres queries.
//! Field names never reach the SQL as raw text; they go through
//! `sea-query` identifier quoting, and every operand is a bind value.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{
    Alias, Expr, Func, Order, PostgresQueryBuilder, Query, SelectStatement, SimpleExpr,
};
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, JsonValue, Statement, sea_query};
use serde_json::{Map, Value};
use tracing::debug;

use sofra_core::report::{
    AggregateFunction, AggregateRequest, Comparison, Condition, ReportEngine, ReportEntity,
    ReportError, Row, RowQuery, Scalar, SortDirection, StorageDelegate,
};

/// Result column for count queries.
const COUNT_ALIAS: &str = "row_count";

/// A storage delegate backed by one Postgres table.
pub struct SqlDelegate {
    db: DatabaseConnection,
    table: &'static str,
}

impl SqlDelegate {
    /// Creates the delegate for one entity's table.
    #[must_use]
    pub fn new(db: DatabaseConnection, entity: ReportEntity) -> Self {
        Self {
            db,
            table: entity.as_str(),
        }
    }

    async fn fetch_json(&self, statement: SelectStatement) -> Result<Vec<JsonValue>, ReportError> {
        let (sql, values) = statement.build(PostgresQueryBuilder);
        debug!(table = self.table, %sql, "executing report statement");
        let statement = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);
        JsonValue::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(|e| ReportError::Storage(e.to_string()))
    }
}

#[async_trait]
impl StorageDelegate for SqlDelegate {
    async fn count(&self, condition: &Condition) -> Result<u64, ReportError> {
        let statement = count_statement(self.table, condition);
        let rows = self.fetch_json(statement).await?;
        let count = rows
            .first()
            .and_then(|row| row.get(COUNT_ALIAS))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(count)
    }

    async fn find_many(&self, query: &RowQuery) -> Result<Vec<Row>, ReportError> {
        let statement = rows_statement(self.table, query);
        let rows = self.fetch_json(statement).await?;
        Ok(rows.into_iter().map(into_row).collect())
    }

    async fn aggregate(
        &self,
        condition: &Condition,
        requests: &[AggregateRequest],
    ) -> Result<Map<String, Value>, ReportError> {
        let statement = aggregate_statement(self.table, condition, requests);
        let rows = self.fetch_json(statement).await?;
        Ok(rows.into_iter().next().map(into_row).unwrap_or_default())
    }
}

/// Registers one delegate per supported entity.
pub fn register_delegates(engine: &mut ReportEngine, db: &DatabaseConnection) {
    for entity in ReportEntity::ALL {
        engine.register(entity, Arc::new(SqlDelegate::new(db.clone(), entity)));
    }
}

fn into_row(value: JsonValue) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// QUERY BUILDING
// ============================================================================

fn count_statement(table: &str, condition: &Condition) -> SelectStatement {
    Query::select()
        .expr_as(Func::count(Expr::col(Alias::new("id"))), Alias::new(COUNT_ALIAS))
        .from(Alias::new(table))
        .cond_where(sql_condition(condition))
        .to_owned()
}

fn rows_statement(table: &str, query: &RowQuery) -> SelectStatement {
    let mut statement = Query::select();
    for column in &query.select {
        statement.column(Alias::new(column));
    }
    statement
        .from(Alias::new(table))
        .cond_where(sql_condition(&query.condition));

    for (field, direction) in &query.order_by {
        let order = match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        statement.order_by(Alias::new(field), order);
    }

    if let Some(skip) = query.skip {
        statement.offset(skip);
    }
    if let Some(take) = query.take {
        statement.limit(take);
    }

    statement.to_owned()
}

fn aggregate_statement(
    table: &str,
    condition: &Condition,
    requests: &[AggregateRequest],
) -> SelectStatement {
    let mut statement = Query::select();
    for request in requests {
        let column = Expr::col(Alias::new(request.field.as_str()));
        let expr: SimpleExpr = match request.function {
            AggregateFunction::Sum => Func::sum(column).into(),
            AggregateFunction::Avg => Func::avg(column).into(),
            AggregateFunction::Count => Func::count(column).into(),
            AggregateFunction::Min => Func::min(column).into(),
            AggregateFunction::Max => Func::max(column).into(),
        };
        statement.expr_as(expr, Alias::new(request.alias.as_str()));
    }
    statement
        .from(Alias::new(table))
        .cond_where(sql_condition(condition))
        .to_owned()
}

/// Translates the engine's condition tree into a `sea-query` condition.
fn sql_condition(condition: &Condition) -> sea_query::Condition {
    match condition {
        Condition::All(children) => children
            .iter()
            .fold(sea_query::Condition::all(), |acc, child| {
                acc.add(sql_condition(child))
            }),
        Condition::Field { field, comparison } => {
            sea_query::Condition::all().add(comparison_expr(field, comparison))
        }
    }
}

fn comparison_expr(field: &str, comparison: &Comparison) -> SimpleExpr {
    let column = Expr::col(Alias::new(field));
    match comparison {
        Comparison::Eq(s) => column.eq(scalar_value(s)),
        Comparison::Ne(s) => column.ne(scalar_value(s)),
        Comparison::Gt(s) => column.gt(scalar_value(s)),
        Comparison::Gte(s) => column.gte(scalar_value(s)),
        Comparison::Lt(s) => column.lt(scalar_value(s)),
        Comparison::Lte(s) => column.lte(scalar_value(s)),
        Comparison::Contains(text) => column.like(format!("%{}%", escape_like(text))),
        Comparison::StartsWith(text) => column.like(format!("{}%", escape_like(text))),
        Comparison::EndsWith(text) => column.like(format!("%{}", escape_like(text))),
        Comparison::In(values) => column.is_in(values.iter().map(scalar_value)),
        Comparison::NotIn(values) => column.is_not_in(values.iter().map(scalar_value)),
        Comparison::Between(low, high) => column.between(scalar_value(low), scalar_value(high)),
        Comparison::IsNull => column.is_null(),
        Comparison::IsNotNull => column.is_not_null(),
    }
}

fn scalar_value(scalar: &Scalar) -> sea_orm::Value {
    match scalar {
        Scalar::Text(s) => s.clone().into(),
        Scalar::Number(d) => (*d).into(),
        Scalar::Bool(b) => (*b).into(),
        Scalar::Date(d) => (*d).into(),
        Scalar::Id(id) => (*id).into(),
    }
}

/// Escapes LIKE metacharacters so operands match literally.
fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
#[path = "delegates_tests.rs"]
mod tests;

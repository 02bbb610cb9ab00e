//! Report execution audit log.
//!
//! Every query and export appends one row, success or failure. Logging
//! never fails the request it describes; callers log and continue when
//! the insert errors.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use sofra_shared::types::PageRequest;

use crate::entities::report_executions;

/// One execution to record.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    /// Template the execution ran from, if any.
    pub template_id: Option<Uuid>,
    /// Entity queried (stable string form).
    pub entity: String,
    /// Requesting user.
    pub executed_by: Uuid,
    /// Requester's branch, when branch-scoped.
    pub branch_id: Option<Uuid>,
    /// Snapshot of the configuration that ran.
    pub config_snapshot: serde_json::Value,
    /// Filters the execution actually applied.
    pub applied_filters: serde_json::Value,
    /// Rows returned (or exported).
    pub row_count: u64,
    /// End-to-end duration.
    pub duration_ms: u64,
    /// Export format for downloads, `None` for plain queries.
    pub export_format: Option<String>,
    /// Rendered document size for downloads.
    pub file_size_bytes: Option<u64>,
    /// Error message for failed executions.
    pub error: Option<String>,
}

/// Execution log repository.
#[derive(Debug, Clone)]
pub struct ExecutionLogRepository {
    db: DatabaseConnection,
}

impl ExecutionLogRepository {
    /// Creates a new execution log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one execution record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record(&self, record: ExecutionRecord) -> Result<report_executions::Model, DbErr> {
        let status = if record.error.is_none() {
            "success"
        } else {
            "failed"
        };

        report_executions::ActiveModel {
            id: Set(Uuid::new_v4()),
            template_id: Set(record.template_id),
            entity: Set(record.entity),
            executed_by: Set(record.executed_by),
            branch_id: Set(record.branch_id),
            config_snapshot: Set(record.config_snapshot),
            applied_filters: Set(record.applied_filters),
            row_count: Set(i64::try_from(record.row_count).unwrap_or(i64::MAX)),
            duration_ms: Set(i64::try_from(record.duration_ms).unwrap_or(i64::MAX)),
            export_format: Set(record.export_format),
            file_size_bytes: Set(record
                .file_size_bytes
                .map(|size| i64::try_from(size).unwrap_or(i64::MAX))),
            status: Set(status.to_string()),
            error_message: Set(record.error),
            executed_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Lists executions, newest first, optionally narrowed to one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        executed_by: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<report_executions::Model>, u64), DbErr> {
        let mut query = report_executions::Entity::find();
        if let Some(user_id) = executed_by {
            query = query.filter(report_executions::Column::ExecutedBy.eq(user_id));
        }
        let query = query.order_by_desc(report_executions::Column::ExecutedAt);

        let total = query.clone().count(&self.db).await?;
        let executions = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok((executions, total))
    }
}

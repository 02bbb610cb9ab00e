//! Report execution routes.
//!
//! Query and export share one pipeline: the engine validates and runs
//! the configuration, the handler logs the execution, and export
//! additionally renders the rows into a downloadable document.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::{error_response, from_report_error, internal_error};
use crate::{AppState, middleware::ReportUser};
use sofra_core::export::{ExportFormat, content_disposition, export};
use sofra_core::report::{
    QueryResult, ReportConfiguration, ReportEntity, ReportError, ReportUserContext, data_sources,
};
use sofra_db::repositories::execution_log::{ExecutionLogRepository, ExecutionRecord};
use sofra_db::repositories::metadata::FieldCatalogRepository;
use sofra_shared::types::{PageMeta, PageRequest, PageResponse};

/// Creates the report routes (requires the user-context middleware to
/// be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/query", post(execute_report))
        .route("/reports/export", post(export_report))
        .route("/reports/data-sources", get(list_data_sources))
        .route("/reports/fields/{entity}", get(list_fields))
        .route("/reports/executions", get(list_executions))
}

// ============================================================================
// Request Types
// ============================================================================

/// Body for export requests.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Report to run.
    pub configuration: ReportConfiguration,
    /// Target format: `excel`, `csv`, or `pdf`.
    pub format: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs a report and returns rows, count, and aggregates as JSON.
async fn execute_report(
    State(state): State<AppState>,
    user: ReportUser,
    Json(config): Json<ReportConfiguration>,
) -> Response {
    match state.engine.execute_query(&config, &user.0).await {
        Ok(result) => {
            log_execution(&state, &config, &user.0, &result, None, None).await;
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            log_failure(&state, &config, &user.0, None, &e).await;
            error_response(&from_report_error(&e))
        }
    }
}

/// Runs a report and streams it back as a document download.
///
/// Pagination is ignored here: a download always covers the full
/// filtered row set, not the page the client happened to be viewing.
async fn export_report(
    State(state): State<AppState>,
    user: ReportUser,
    Json(request): Json<ExportRequest>,
) -> Response {
    let format = match ExportFormat::parse(&request.format) {
        Ok(format) => format,
        Err(e) => return error_response(&from_report_error(&e)),
    };

    let mut config = request.configuration;
    config.pagination.enabled = false;

    let result = match state.engine.execute_query(&config, &user.0).await {
        Ok(result) => result,
        Err(e) => {
            log_failure(&state, &config, &user.0, Some(format), &e).await;
            return error_response(&from_report_error(&e));
        }
    };

    let fields = config.visible_fields();
    let rendered = match export(
        &result.rows,
        &fields,
        format,
        config.export.file_name.as_deref(),
    ) {
        Ok(rendered) => rendered,
        Err(e) => {
            log_failure(&state, &config, &user.0, Some(format), &e).await;
            return error_response(&from_report_error(&e));
        }
    };

    log_execution(
        &state,
        &config,
        &user.0,
        &result,
        Some(format),
        Some(rendered.buffer.len() as u64),
    )
    .await;

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&rendered.file_name),
            ),
        ],
        rendered.buffer,
    )
        .into_response()
}

/// Lists the entities reports can read.
async fn list_data_sources() -> Response {
    (StatusCode::OK, Json(json!({ "dataSources": data_sources() }))).into_response()
}

/// Lists the field catalog for one entity.
async fn list_fields(State(state): State<AppState>, Path(entity): Path<String>) -> Response {
    let Some(entity) = ReportEntity::parse(&entity) else {
        return error_response(&from_report_error(&ReportError::UnknownEntity(entity)));
    };

    let catalog = FieldCatalogRepository::new((*state.db).clone());
    match catalog.fields_for_entity(entity).await {
        Ok(fields) => (StatusCode::OK, Json(json!({ "fields": fields }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load field catalog");
            internal_error()
        }
    }
}

/// Lists recent executions. Admins see everyone's history; other users
/// see only their own.
async fn list_executions(
    State(state): State<AppState>,
    user: ReportUser,
    Query(page): Query<PageRequest>,
) -> Response {
    let executed_by = if user.0.role.is_admin() {
        None
    } else {
        Some(user.0.user_id)
    };

    let log = ExecutionLogRepository::new((*state.db).clone());
    match log.list(executed_by, &page).await {
        Ok((executions, total)) => {
            let response = PageResponse {
                data: executions,
                meta: PageMeta::from_request(&page, total),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list report executions");
            internal_error()
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Appends an execution record; logging failures never fail the request.
async fn log_execution(
    state: &AppState,
    config: &ReportConfiguration,
    user: &ReportUserContext,
    result: &QueryResult,
    format: Option<ExportFormat>,
    file_size_bytes: Option<u64>,
) {
    let log = ExecutionLogRepository::new((*state.db).clone());
    let record = ExecutionRecord {
        template_id: None,
        entity: config.entity.as_str().to_string(),
        executed_by: user.user_id,
        branch_id: user.branch_id,
        config_snapshot: config_snapshot(config),
        applied_filters: applied_filters(config),
        row_count: result.rows.len() as u64,
        duration_ms: result.execution_time_ms,
        export_format: format.map(|f| f.extension().to_string()),
        file_size_bytes,
        error: None,
    };
    if let Err(e) = log.record(record).await {
        error!(error = %e, "Failed to record report execution");
    }
}

/// Appends a failed-execution record.
async fn log_failure(
    state: &AppState,
    config: &ReportConfiguration,
    user: &ReportUserContext,
    format: Option<ExportFormat>,
    failure: &ReportError,
) {
    let log = ExecutionLogRepository::new((*state.db).clone());
    let record = ExecutionRecord {
        template_id: None,
        entity: config.entity.as_str().to_string(),
        executed_by: user.user_id,
        branch_id: user.branch_id,
        config_snapshot: config_snapshot(config),
        applied_filters: applied_filters(config),
        row_count: 0,
        duration_ms: 0,
        export_format: format.map(|f| f.extension().to_string()),
        file_size_bytes: None,
        error: Some(failure.to_string()),
    };
    if let Err(e) = log.record(record).await {
        error!(error = %e, "Failed to record report execution");
    }
}

fn config_snapshot(config: &ReportConfiguration) -> serde_json::Value {
    serde_json::to_value(config).unwrap_or(serde_json::Value::Null)
}

fn applied_filters(config: &ReportConfiguration) -> serde_json::Value {
    serde_json::to_value(&config.filters).unwrap_or(serde_json::Value::Null)
}

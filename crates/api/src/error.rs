//! HTTP rendering for application errors.
//!
//! Domain errors from the engine and the repositories are mapped into
//! the shared [`AppError`] taxonomy, which owns the status code and the
//! stable error code clients switch on. Storage and database failures
//! are logged here and surface as a generic internal error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use sofra_core::report::ReportError;
use sofra_db::repositories::template::TemplateError;
use sofra_shared::error::AppError;

/// Renders an [`AppError`] as the standard JSON error body.
pub fn error_response(error: &AppError) -> Response {
    let status = StatusCode::from_u16(error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": error.error_code(), "message": error.to_string() })),
    )
        .into_response()
}

/// The generic 500 response for failures callers cannot act on.
pub fn internal_error() -> Response {
    error_response(&AppError::Internal("An error occurred".to_string()))
}

/// Maps a report execution error into the app-wide taxonomy.
pub fn from_report_error(error: &ReportError) -> AppError {
    match error {
        ReportError::UnknownEntity(entity) => {
            AppError::NotFound(format!("report entity '{entity}'"))
        }
        ReportError::InvalidConfiguration(reason) => AppError::Validation(reason.clone()),
        ReportError::BranchRequired => {
            AppError::Forbidden("branch-scoped users must have an assigned branch".to_string())
        }
        ReportError::UnsupportedFormat(format) => {
            AppError::Validation(format!("unsupported export format '{format}'"))
        }
        ReportError::Export(_) | ReportError::Storage(_) => {
            error!(error = %error, "Report execution failed");
            AppError::Internal("An error occurred".to_string())
        }
    }
}

/// Maps a template repository error into the app-wide taxonomy.
pub fn from_template_error(error: &TemplateError) -> AppError {
    match error {
        TemplateError::NotFound(id) => AppError::NotFound(format!("template {id}")),
        TemplateError::Forbidden(id) => AppError::Forbidden(format!("template {id}")),
        TemplateError::AdminRequired => {
            AppError::Forbidden("only administrators can manage report templates".to_string())
        }
        TemplateError::InvalidConfiguration(reason) => AppError::Validation(reason.clone()),
        TemplateError::Database(e) => {
            error!(error = %e, "Template operation failed");
            AppError::Internal("An error occurred".to_string())
        }
    }
}

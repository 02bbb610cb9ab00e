//! Report template routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{error_response, from_template_error};
use crate::middleware::ReportUser;
use crate::AppState;
use sofra_core::report::ReportConfiguration;
use sofra_db::repositories::template::{TemplateInput, TemplateRepository};

/// Creates the template routes (requires the user-context middleware to
/// be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports/templates",
            get(list_templates).post(create_template),
        )
        .route(
            "/reports/templates/{id}",
            put(update_template).get(get_template).delete(delete_template),
        )
}

/// Body for template create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    /// Template name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Report type key.
    pub report_type: String,
    /// Report configuration.
    pub configuration: ReportConfiguration,
    /// Visible to all users.
    #[serde(default)]
    pub is_public: bool,
    /// Default template for its report type.
    #[serde(default)]
    pub is_default: bool,
}

impl From<TemplateRequest> for TemplateInput {
    fn from(request: TemplateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            report_type: request.report_type,
            configuration: request.configuration,
            is_public: request.is_public,
            is_default: request.is_default,
        }
    }
}

async fn list_templates(State(state): State<AppState>, user: ReportUser) -> Response {
    let repo = TemplateRepository::new((*state.db).clone());
    match repo.list_for_user(&user.0).await {
        Ok(templates) => (StatusCode::OK, Json(json!({ "templates": templates }))).into_response(),
        Err(e) => error_response(&from_template_error(&e)),
    }
}

async fn get_template(
    State(state): State<AppState>,
    user: ReportUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = TemplateRepository::new((*state.db).clone());
    match repo.get_for_user(id, &user.0).await {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(e) => error_response(&from_template_error(&e)),
    }
}

async fn create_template(
    State(state): State<AppState>,
    user: ReportUser,
    Json(request): Json<TemplateRequest>,
) -> Response {
    let repo = TemplateRepository::new((*state.db).clone());
    match repo.create(request.into(), &user.0).await {
        Ok(template) => (StatusCode::CREATED, Json(template)).into_response(),
        Err(e) => error_response(&from_template_error(&e)),
    }
}

async fn update_template(
    State(state): State<AppState>,
    user: ReportUser,
    Path(id): Path<Uuid>,
    Json(request): Json<TemplateRequest>,
) -> Response {
    let repo = TemplateRepository::new((*state.db).clone());
    match repo.update(id, request.into(), &user.0).await {
        Ok(template) => (StatusCode::OK, Json(template)).into_response(),
        Err(e) => error_response(&from_template_error(&e)),
    }
}

async fn delete_template(
    State(state): State<AppState>,
    user: ReportUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = TemplateRepository::new((*state.db).clone());
    match repo.delete(id, &user.0).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&from_template_error(&e)),
    }
}

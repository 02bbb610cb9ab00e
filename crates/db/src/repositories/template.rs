//! Report template repository.
//!
//! Templates are named, persisted report configurations. At most one
//! non-deleted template per report type is the default; that invariant
//! is enforced transactionally here and backed by a partial unique index
//! in the schema.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use sofra_core::report::{ReportConfiguration, ReportUserContext, validate_configuration};

use crate::entities::report_templates;

/// Error types for template operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template not found or soft-deleted.
    #[error("Template not found: {0}")]
    NotFound(Uuid),

    /// Caller may not modify this template. Read paths never produce
    /// this; an invisible template reads as [`TemplateError::NotFound`].
    #[error("Access denied to template: {0}")]
    Forbidden(Uuid),

    /// Operation requires the admin role.
    #[error("Only administrators can manage report templates")]
    AdminRequired,

    /// Embedded configuration failed validation.
    #[error("Invalid template configuration: {0}")]
    InvalidConfiguration(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fields accepted on create and update.
#[derive(Debug, Clone)]
pub struct TemplateInput {
    /// Template name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Report type key the default-exclusivity invariant groups by.
    pub report_type: String,
    /// The report configuration to persist.
    pub configuration: ReportConfiguration,
    /// Visible to every user, not only the owner.
    pub is_public: bool,
    /// Default template for its report type.
    pub is_default: bool,
}

/// Template repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    db: DatabaseConnection,
}

impl TemplateRepository {
    /// Creates a new template repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a template. Admin only; the embedded configuration is
    /// validated before anything is written.
    ///
    /// # Errors
    ///
    /// Returns an error when the caller is not an admin, the
    /// configuration is invalid, or the insert fails.
    pub async fn create(
        &self,
        input: TemplateInput,
        user: &ReportUserContext,
    ) -> Result<report_templates::Model, TemplateError> {
        if !user.role.is_admin() {
            return Err(TemplateError::AdminRequired);
        }
        let configuration = validated_json(&input.configuration)?;

        let now = chrono::Utc::now().into();
        let txn = self.db.begin().await?;
        if input.is_default {
            clear_other_defaults(&txn, &input.report_type, None).await?;
        }
        let model = report_templates::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            report_type: Set(input.report_type),
            configuration: Set(configuration),
            is_public: Set(input.is_public),
            is_default: Set(input.is_default),
            created_by: Set(user.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(model)
    }

    /// Lists templates visible to the caller: public ones plus their
    /// own (admins see everything). Defaults first, then most recently
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user: &ReportUserContext,
    ) -> Result<Vec<report_templates::Model>, TemplateError> {
        let mut query = report_templates::Entity::find()
            .filter(report_templates::Column::DeletedAt.is_null());

        if !user.role.is_admin() {
            query = query.filter(
                report_templates::Column::IsPublic
                    .eq(true)
                    .or(report_templates::Column::CreatedBy.eq(user.user_id)),
            );
        }

        let templates = query
            .order_by_desc(report_templates::Column::IsDefault)
            .order_by_desc(report_templates::Column::UpdatedAt)
            .all(&self.db)
            .await?;
        Ok(templates)
    }

    /// Fetches one template the caller may see.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for missing and soft-deleted templates, and
    /// also for private templates the caller does not own, so a caller
    /// cannot tell a hidden template apart from a nonexistent one.
    pub async fn get_for_user(
        &self,
        id: Uuid,
        user: &ReportUserContext,
    ) -> Result<report_templates::Model, TemplateError> {
        let template = self.find_active(id).await?;
        visible_or_not_found(template, user)
    }

    /// The default template for a report type, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn default_for_type(
        &self,
        report_type: &str,
    ) -> Result<Option<report_templates::Model>, TemplateError> {
        let template = report_templates::Entity::find()
            .filter(report_templates::Column::ReportType.eq(report_type))
            .filter(report_templates::Column::IsDefault.eq(true))
            .filter(report_templates::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(template)
    }

    /// Updates a template the caller owns (or any, for admins). Making
    /// a template the default clears the previous default of the same
    /// report type in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error for missing templates, callers without access,
    /// invalid configurations, or database failures.
    pub async fn update(
        &self,
        id: Uuid,
        input: TemplateInput,
        user: &ReportUserContext,
    ) -> Result<report_templates::Model, TemplateError> {
        let existing = self.find_active(id).await?;
        if !can_modify(&existing, user) {
            return Err(TemplateError::Forbidden(id));
        }
        let configuration = validated_json(&input.configuration)?;

        let txn = self.db.begin().await?;
        if input.is_default {
            clear_other_defaults(&txn, &input.report_type, Some(id)).await?;
        }
        let model = report_templates::ActiveModel {
            id: Set(id),
            name: Set(input.name),
            description: Set(input.description),
            report_type: Set(input.report_type),
            configuration: Set(configuration),
            is_public: Set(input.is_public),
            is_default: Set(input.is_default),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        txn.commit().await?;

        Ok(model)
    }

    /// Soft-deletes a template the caller owns (or any, for admins).
    ///
    /// # Errors
    ///
    /// Returns an error for missing templates, callers without access,
    /// or database failures.
    pub async fn delete(&self, id: Uuid, user: &ReportUserContext) -> Result<(), TemplateError> {
        let existing = self.find_active(id).await?;
        if !can_modify(&existing, user) {
            return Err(TemplateError::Forbidden(id));
        }

        let now = chrono::Utc::now().into();
        report_templates::ActiveModel {
            id: Set(id),
            is_default: Set(false),
            deleted_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    async fn find_active(&self, id: Uuid) -> Result<report_templates::Model, TemplateError> {
        report_templates::Entity::find_by_id(id)
            .filter(report_templates::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(TemplateError::NotFound(id))
    }
}

/// Whether the caller may read this template.
fn can_view(template: &report_templates::Model, user: &ReportUserContext) -> bool {
    user.role.is_admin() || template.is_public || template.created_by == user.user_id
}

/// Whether the caller may modify or delete this template.
fn can_modify(template: &report_templates::Model, user: &ReportUserContext) -> bool {
    user.role.is_admin() || template.created_by == user.user_id
}

/// Answers an invisible template with the same `NotFound` a missing id
/// gets, so read responses never confirm a private template exists.
fn visible_or_not_found(
    template: report_templates::Model,
    user: &ReportUserContext,
) -> Result<report_templates::Model, TemplateError> {
    if can_view(&template, user) {
        Ok(template)
    } else {
        Err(TemplateError::NotFound(template.id))
    }
}

fn validated_json(configuration: &ReportConfiguration) -> Result<serde_json::Value, TemplateError> {
    validate_configuration(configuration)
        .map_err(|e| TemplateError::InvalidConfiguration(e.to_string()))?;
    serde_json::to_value(configuration)
        .map_err(|e| TemplateError::InvalidConfiguration(e.to_string()))
}

/// Demotes every other default of the same report type. Runs inside the
/// caller's transaction so promotion is atomic.
async fn clear_other_defaults<C: ConnectionTrait>(
    conn: &C,
    report_type: &str,
    keep: Option<Uuid>,
) -> Result<(), DbErr> {
    let mut update = report_templates::Entity::update_many()
        .col_expr(report_templates::Column::IsDefault, Expr::value(false))
        .filter(report_templates::Column::ReportType.eq(report_type))
        .filter(report_templates::Column::IsDefault.eq(true))
        .filter(report_templates::Column::DeletedAt.is_null());
    if let Some(id) = keep {
        update = update.filter(report_templates::Column::Id.ne(id));
    }
    update.exec(conn).await?;
    Ok(())
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

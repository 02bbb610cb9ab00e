//! `SeaORM` Entity for the report_executions audit table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report_executions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    /// Entity the report read (stable string form).
    pub entity: String,
    pub executed_by: Uuid,
    pub branch_id: Option<Uuid>,
    /// Configuration the execution ran with, snapshotted as JSON.
    pub config_snapshot: Json,
    /// Filters after RBAC injection and operator resolution.
    pub applied_filters: Json,
    pub row_count: i64,
    pub duration_ms: i64,
    /// Export format when the execution was a download, null for queries.
    pub export_format: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub status: String,
    pub error_message: Option<String>,
    pub executed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report_templates::Entity",
        from = "Column::TemplateId",
        to = "super::report_templates::Column::Id"
    )]
    ReportTemplates,
}

impl Related<super::report_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportTemplates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

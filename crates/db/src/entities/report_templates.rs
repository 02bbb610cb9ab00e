//! `SeaORM` Entity for the report_templates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub report_type: String,
    /// Full report configuration, stored as JSON.
    pub configuration: Json,
    pub is_public: bool,
    pub is_default: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::report_executions::Entity")]
    ReportExecutions,
}

impl Related<super::report_executions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReportExecutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

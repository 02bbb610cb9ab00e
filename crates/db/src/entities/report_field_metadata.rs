//! `SeaORM` Entity for the report_field_metadata catalog table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "report_field_metadata")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Entity this field belongs to (stable string form).
    pub entity: String,
    pub field_name: String,
    pub display_name: String,
    pub data_type: String,
    pub filterable: bool,
    pub sortable: bool,
    pub aggregatable: bool,
    pub groupable: bool,
    pub default_visible: bool,
    pub default_order: i32,
    pub format: Option<String>,
    /// Fixed value set for enum fields, stored as a JSON array.
    pub enum_values: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Persisted field catalog.
//!
//! Administrators can override the built-in field catalogs by inserting
//! rows into `report_field_metadata`. The read path prefers persisted
//! rows and falls back to the built-in defaults, so every entity always
//! has a catalog.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;

use sofra_core::report::{FieldDataType, FieldMetadata, ReportEntity, default_fields};

use crate::entities::report_field_metadata;

/// Field catalog repository.
#[derive(Debug, Clone)]
pub struct FieldCatalogRepository {
    db: DatabaseConnection,
}

impl FieldCatalogRepository {
    /// Creates a new field catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The field catalog for one entity: persisted rows when any exist,
    /// otherwise the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn fields_for_entity(
        &self,
        entity: ReportEntity,
    ) -> Result<Vec<FieldMetadata>, DbErr> {
        let persisted = report_field_metadata::Entity::find()
            .filter(report_field_metadata::Column::Entity.eq(entity.as_str()))
            .order_by_asc(report_field_metadata::Column::DefaultOrder)
            .all(&self.db)
            .await?;

        if persisted.is_empty() {
            return Ok(default_fields(entity));
        }
        Ok(persisted.into_iter().map(into_metadata).collect())
    }
}

fn into_metadata(model: report_field_metadata::Model) -> FieldMetadata {
    FieldMetadata {
        field_name: model.field_name,
        display_name: model.display_name,
        data_type: parse_data_type(&model.data_type),
        filterable: model.filterable,
        sortable: model.sortable,
        aggregatable: model.aggregatable,
        groupable: model.groupable,
        default_visible: model.default_visible,
        default_order: model.default_order,
        format: model.format,
        enum_values: model.enum_values.and_then(|values| match values {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect(),
            ),
            _ => None,
        }),
    }
}

/// Parses a stored data type name, defaulting to text for anything a
/// newer deployment may have written.
fn parse_data_type(name: &str) -> FieldDataType {
    match name {
        "number" => FieldDataType::Number,
        "date" => FieldDataType::Date,
        "boolean" => FieldDataType::Boolean,
        "enum" => FieldDataType::Enum,
        _ => FieldDataType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_parsing_defaults_to_text() {
        assert_eq!(parse_data_type("number"), FieldDataType::Number);
        assert_eq!(parse_data_type("enum"), FieldDataType::Enum);
        assert_eq!(parse_data_type("geo_point"), FieldDataType::Text);
    }

    #[test]
    fn test_model_conversion_keeps_enum_values() {
        let now = chrono::Utc::now().into();
        let model = report_field_metadata::Model {
            id: uuid::Uuid::new_v4(),
            entity: "payables".to_string(),
            field_name: "status".to_string(),
            display_name: "Status".to_string(),
            data_type: "enum".to_string(),
            filterable: true,
            sortable: true,
            aggregatable: false,
            groupable: true,
            default_visible: true,
            default_order: 4,
            format: None,
            enum_values: Some(serde_json::json!(["open", "settled"])),
            created_at: now,
            updated_at: now,
        };

        let metadata = into_metadata(model);

        assert_eq!(metadata.data_type, FieldDataType::Enum);
        assert_eq!(
            metadata.enum_values,
            Some(vec!["open".to_string(), "settled".to_string()])
        );
    }
}

//! `SeaORM` entity definitions for the reporting tables.

pub mod report_executions;
pub mod report_field_metadata;
pub mod report_templates;

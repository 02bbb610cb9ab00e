//! Database layer with `SeaORM` entities, repositories, and storage
//! delegates.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for reporting tables
//! - Repository abstractions for templates, execution logs, and the
//!   persisted field catalog
//! - SQL storage delegates driven by the report engine
//! - Database migrations

pub mod delegates;
pub mod entities;
pub mod migration;
pub mod repositories;

pub use delegates::{SqlDelegate, register_delegates};
pub use repositories::{ExecutionLogRepository, FieldCatalogRepository, TemplateRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

//! Repository abstractions for the reporting tables.

pub mod execution_log;
pub mod metadata;
pub mod template;

pub use execution_log::{ExecutionLogRepository, ExecutionRecord};
pub use metadata::FieldCatalogRepository;
pub use template::{TemplateError, TemplateInput, TemplateRepository};

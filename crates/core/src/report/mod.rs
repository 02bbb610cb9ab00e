//! Ad-hoc report execution.
//!
//! A caller describes a report over one of the business entities with a
//! declarative [`ReportConfiguration`]; the engine validates it, builds a
//! storage-neutral condition tree with row-level security applied, drives
//! the entity's storage delegate, and computes aggregations and grouped
//! views over the result.

pub mod aggregate;
pub mod conditions;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod types;
pub mod validate;

pub use aggregate::{AggregateFunction, AggregateRequest, aggregate_requests, group_rows};
pub use conditions::{Comparison, Condition, FilterOperator, Scalar, build_conditions};
pub use engine::{ReportEngine, RowQuery, StorageDelegate};
pub use error::ReportError;
pub use metadata::{DataSource, FieldDataType, FieldMetadata, data_sources, default_fields};
pub use types::*;
pub use validate::validate_configuration;

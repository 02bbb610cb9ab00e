//! Report error types.

use thiserror::Error;

/// Errors that can occur during report execution and export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Entity is not one of the supported report entities.
    #[error("Unknown report entity: {0}")]
    UnknownEntity(String),

    /// Configuration failed structural validation.
    #[error("Invalid report configuration: {0}")]
    InvalidConfiguration(String),

    /// A branch-scoped user has no assigned branch but queried a
    /// branch-scoped entity.
    #[error("Branch-scoped users must have an assigned branch")]
    BranchRequired,

    /// Export format is not one of excel, csv, or pdf.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Export serialization failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Storage delegate failure, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(String),
}

//! Report export.
//!
//! Turns a fetched row set into a downloadable document. Every format
//! treats cell content as hostile: spreadsheet formula injection is
//! neutralized in CSV, markup is escaped in the HTML intermediate, and
//! file names are sanitized before they reach a header or a path.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::report::{ReportError, ReportField, Row};

pub mod csv;
pub mod excel;
pub mod filename;
pub mod html;

pub use filename::sanitize_file_name;

/// Characters kept literal in the RFC 5987 `filename*` value.
const DISPOSITION_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_');

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Excel workbook.
    Excel,
    /// Comma-separated values.
    Csv,
    /// Print-ready styled HTML document.
    Pdf,
}

impl ExportFormat {
    /// Parses a format name.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::UnsupportedFormat`] for anything outside
    /// `excel`, `csv`, `pdf`.
    pub fn parse(name: &str) -> Result<Self, ReportError> {
        match name {
            "excel" => Ok(Self::Excel),
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Csv => "csv",
            Self::Pdf => "html",
        }
    }

    /// MIME type for the download response.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Pdf => "text/html; charset=utf-8",
        }
    }
}

/// A rendered export, ready to stream to the client.
#[derive(Debug, Clone)]
pub struct ExportResult {
    /// Serialized document.
    pub buffer: Vec<u8>,
    /// Sanitized file name, extension included.
    pub file_name: String,
    /// MIME type.
    pub content_type: &'static str,
}

/// Renders rows into the requested format.
///
/// `fields` is the visible-column list in display order; it supplies
/// headers, column order, and width hints. The requested file name is
/// sanitized, with a timestamped fallback when nothing usable remains.
///
/// # Errors
///
/// Returns [`ReportError::Export`] when document serialization fails.
pub fn export(
    rows: &[Row],
    fields: &[&ReportField],
    format: ExportFormat,
    requested_name: Option<&str>,
) -> Result<ExportResult, ReportError> {
    let base = sanitize_file_name(requested_name.unwrap_or_default());
    let file_name = format!("{base}.{}", format.extension());

    let buffer = match format {
        ExportFormat::Excel => excel::render(rows, fields)?,
        ExportFormat::Csv => csv::render(rows, fields),
        ExportFormat::Pdf => html::render(rows, fields, &base).into_bytes(),
    };

    Ok(ExportResult {
        buffer,
        file_name,
        content_type: format.content_type(),
    })
}

/// Builds the `Content-Disposition` header value for a download.
///
/// Emits an ASCII-safe quoted fallback plus an RFC 5987 `filename*`
/// parameter, so non-ASCII names survive every client.
#[must_use]
pub fn content_disposition(file_name: &str) -> String {
    let ascii_fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && c != '"' && c != '\\' && !c.is_ascii_control() {
                c
            } else {
                '_'
            }
        })
        .collect();
    let encoded = utf8_percent_encode(file_name, DISPOSITION_SET);
    format!("attachment; filename=\"{ascii_fallback}\"; filename*=UTF-8''{encoded}")
}

/// Textual form of a cell value, shared by the text-based formats.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;

//! Tests for the export entry point and download headers.

use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

use super::csv::encode_cell;
use super::{ExportFormat, content_disposition, export, sanitize_file_name};
use crate::report::{ReportError, ReportField, Row};

fn fields_owned() -> Vec<ReportField> {
    vec![
        ReportField {
            source_field: "amount".to_string(),
            display_name: "Amount".to_string(),
            visible: true,
            order: 0,
            width: Some(12),
            format: None,
        },
        ReportField {
            source_field: "category".to_string(),
            display_name: "Category".to_string(),
            visible: true,
            order: 1,
            width: None,
            format: None,
        },
    ]
}

fn sample_row() -> Row {
    let mut row = Row::new();
    row.insert("amount".to_string(), json!(42));
    row.insert("category".to_string(), json!("food"));
    row
}

#[rstest]
#[case("excel", ExportFormat::Excel, "xlsx")]
#[case("csv", ExportFormat::Csv, "csv")]
#[case("pdf", ExportFormat::Pdf, "html")]
fn test_format_parse_and_extension(
    #[case] name: &str,
    #[case] expected: ExportFormat,
    #[case] extension: &str,
) {
    let format = ExportFormat::parse(name).unwrap();
    assert_eq!(format, expected);
    assert_eq!(format.extension(), extension);
}

#[test]
fn test_unknown_format_is_rejected() {
    let err = ExportFormat::parse("docx").unwrap_err();
    assert!(matches!(err, ReportError::UnsupportedFormat(f) if f == "docx"));
}

#[test]
fn test_csv_export_carries_bom_and_name() {
    let owned = fields_owned();
    let fields: Vec<&ReportField> = owned.iter().collect();

    let result = export(&[sample_row()], &fields, ExportFormat::Csv, Some("sales")).unwrap();

    assert_eq!(result.file_name, "sales.csv");
    assert_eq!(result.content_type, "text/csv; charset=utf-8");
    assert_eq!(&result.buffer[..3], &[0xEF, 0xBB, 0xBF]);
}

#[test]
fn test_excel_export_is_a_workbook() {
    let owned = fields_owned();
    let fields: Vec<&ReportField> = owned.iter().collect();

    let result = export(&[sample_row()], &fields, ExportFormat::Excel, Some("sales")).unwrap();

    assert_eq!(result.file_name, "sales.xlsx");
    assert_eq!(&result.buffer[..2], b"PK");
}

#[test]
fn test_pdf_export_serves_printable_html() {
    let owned = fields_owned();
    let fields: Vec<&ReportField> = owned.iter().collect();

    let result = export(&[sample_row()], &fields, ExportFormat::Pdf, Some("sales")).unwrap();

    assert_eq!(result.file_name, "sales.html");
    let document = String::from_utf8(result.buffer).unwrap();
    assert!(document.contains("dir=\"rtl\""));
    assert!(document.contains("<th>Amount</th>"));
}

#[test]
fn test_missing_name_falls_back_to_timestamp() {
    let owned = fields_owned();
    let fields: Vec<&ReportField> = owned.iter().collect();

    let result = export(&[], &fields, ExportFormat::Csv, None).unwrap();

    assert!(result.file_name.starts_with("report_"));
    assert!(result.file_name.ends_with(".csv"));
}

#[test]
fn test_hostile_name_is_sanitized_before_the_header() {
    let owned = fields_owned();
    let fields: Vec<&ReportField> = owned.iter().collect();

    let result = export(&[], &fields, ExportFormat::Csv, Some("../../etc/passwd")).unwrap();

    assert!(!result.file_name.contains(".."));
    assert!(!result.file_name.contains('/'));
}

#[test]
fn test_content_disposition_ascii_name() {
    assert_eq!(
        content_disposition("sales.csv"),
        "attachment; filename=\"sales.csv\"; filename*=UTF-8''sales.csv"
    );
}

#[test]
fn test_content_disposition_encodes_non_ascii() {
    let header = content_disposition("تقرير.csv");
    assert!(header.starts_with("attachment; filename=\""));
    // The quoted fallback must stay pure ASCII.
    let fallback = header.split('"').nth(1).unwrap();
    assert!(fallback.is_ascii());
    assert!(header.contains("filename*=UTF-8''%D8%AA"));
}

#[test]
fn test_content_disposition_never_emits_raw_quotes() {
    let header = content_disposition("a\"b.csv");
    assert_eq!(
        header.split('"').nth(1),
        Some("a_b.csv"),
        "quote must be replaced in the fallback"
    );
}

proptest! {
    #[test]
    fn prop_sanitized_names_are_always_safe(input in ".{0,300}") {
        let name = sanitize_file_name(&input);
        prop_assert!(!name.is_empty());
        prop_assert!(!name.contains('/') && !name.contains('\\'));
        prop_assert!(!name.contains(".."));
        prop_assert!(!name.chars().any(char::is_control));
        prop_assert!(name.chars().count() <= 200);
    }

    #[test]
    fn prop_encoded_cells_never_open_as_formulas(input in ".{0,120}") {
        let encoded = encode_cell(&input);
        let first = encoded.chars().next();
        prop_assert!(!matches!(first, Some('=' | '+' | '-' | '@')));
        prop_assert!(!encoded.contains('\n') && !encoded.contains('\r'));
    }
}

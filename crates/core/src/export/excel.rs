//! Excel workbook rendering via `rust_xlsxwriter`.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};
use serde_json::Value;

use crate::report::{ReportError, ReportField, Row};

/// Header row fill color.
const HEADER_FILL: Color = Color::RGB(0x2F_5496);

/// Renders rows into a single right-to-left worksheet: styled header
/// row of display names, one worksheet row per data row, column widths
/// from the field hints.
///
/// # Errors
///
/// Returns [`ReportError::Export`] when workbook serialization fails.
pub fn render(rows: &[Row], fields: &[&ReportField]) -> Result<Vec<u8>, ReportError> {
    build_workbook(rows, fields).map_err(|e| ReportError::Export(e.to_string()))
}

fn build_workbook(rows: &[Row], fields: &[&ReportField]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_right_to_left(true);

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);

    for (col, field) in fields.iter().enumerate() {
        let col = col as u16;
        sheet.write_with_format(0, col, &field.display_name, &header_format)?;
        if let Some(width) = field.width {
            sheet.set_column_width(col, f64::from(width))?;
        }
    }

    for (index, row) in rows.iter().enumerate() {
        let sheet_row = (index + 1) as u32;
        for (col, field) in fields.iter().enumerate() {
            let col = col as u16;
            match row.get(&field.source_field) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    if let Some(number) = n.as_f64() {
                        sheet.write_number(sheet_row, col, number)?;
                    } else {
                        sheet.write_string(sheet_row, col, n.to_string())?;
                    }
                }
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(sheet_row, col, *b)?;
                }
                Some(Value::String(s)) => {
                    sheet.write_string(sheet_row, col, s)?;
                }
                Some(other) => {
                    sheet.write_string(sheet_row, col, other.to_string())?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(source: &str, display: &str, width: Option<u32>) -> ReportField {
        ReportField {
            source_field: source.to_string(),
            display_name: display.to_string(),
            visible: true,
            order: 0,
            width,
            format: None,
        }
    }

    #[test]
    fn test_workbook_renders_to_zip_container() {
        let fields_owned = [
            field("amount", "Amount", Some(14)),
            field("category", "Category", None),
        ];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();
        let mut row = Row::new();
        row.insert("amount".to_string(), json!(149.5));
        row.insert("category".to_string(), json!("food"));

        let buffer = render(&[row], &fields).unwrap();

        // XLSX is a zip archive; PK is the zip local-file magic.
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn test_empty_row_set_still_renders_headers() {
        let fields_owned = [field("amount", "Amount", None)];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();

        let buffer = render(&[], &fields).unwrap();

        assert!(!buffer.is_empty());
    }
}

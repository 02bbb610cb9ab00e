//! CSV rendering.

use crate::report::{ReportField, Row};

use super::cell_text;

/// UTF-8 byte order mark, so spreadsheet applications detect the
/// encoding instead of guessing a legacy codepage.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Characters that make a spreadsheet treat a cell as a formula.
const FORMULA_LEADERS: [char; 4] = ['=', '+', '-', '@'];

/// Renders rows as a CSV document: BOM, header row of display names,
/// then one line per row in field order.
#[must_use]
pub fn render(rows: &[Row], fields: &[&ReportField]) -> Vec<u8> {
    let mut out = String::new();
    let header: Vec<String> = fields
        .iter()
        .map(|f| encode_cell(&f.display_name))
        .collect();
    out.push_str(&header.join(","));
    out.push_str("\r\n");

    for row in rows {
        let line: Vec<String> = fields
            .iter()
            .map(|f| {
                let text = row.get(&f.source_field).map(cell_text).unwrap_or_default();
                encode_cell(&text)
            })
            .collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }

    let mut buffer = Vec::with_capacity(BOM.len() + out.len());
    buffer.extend_from_slice(BOM);
    buffer.extend_from_slice(out.as_bytes());
    buffer
}

/// Encodes one cell: newlines collapsed to spaces, formula leaders
/// guarded with a leading apostrophe, then standard CSV quoting with
/// doubled quotes where needed.
#[must_use]
pub fn encode_cell(text: &str) -> String {
    let flattened = text.replace("\r\n", " ").replace(['\r', '\n'], " ");

    let guarded = if flattened.starts_with(FORMULA_LEADERS) {
        format!("'{flattened}")
    } else {
        flattened
    };

    if guarded.contains([',', '"']) {
        format!("\"{}\"", guarded.replace('"', "\"\""))
    } else {
        guarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(source: &str, display: &str) -> ReportField {
        ReportField {
            source_field: source.to_string(),
            display_name: display.to_string(),
            visible: true,
            order: 0,
            width: None,
            format: None,
        }
    }

    #[test]
    fn test_formula_injection_is_guarded() {
        assert_eq!(encode_cell("=2+2"), "'=2+2");
        assert_eq!(encode_cell("+SUM(A1:A9)"), "'+SUM(A1:A9)");
        assert_eq!(encode_cell("-1234"), "'-1234");
        assert_eq!(encode_cell("@cmd"), "'@cmd");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(encode_cell("shawarma plate"), "shawarma plate");
    }

    #[test]
    fn test_quotes_are_doubled_and_wrapped() {
        assert_eq!(encode_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_commas_force_quoting() {
        assert_eq!(encode_cell("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_newlines_collapse_to_spaces() {
        assert_eq!(encode_cell("line one\r\nline two\nthree"), "line one line two three");
    }

    #[test]
    fn test_document_starts_with_bom_and_header() {
        let fields_owned = [field("amount", "Amount")];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();
        let mut row = Row::new();
        row.insert("amount".to_string(), json!(42));

        let buffer = render(&[row], &fields);

        assert_eq!(&buffer[..3], &[0xEF, 0xBB, 0xBF]);
        let text = std::str::from_utf8(&buffer[3..]).unwrap();
        assert_eq!(text, "Amount\r\n42\r\n");
    }

    #[test]
    fn test_missing_column_renders_empty_cell() {
        let fields_owned = [field("amount", "Amount"), field("category", "Category")];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();
        let mut row = Row::new();
        row.insert("amount".to_string(), json!(7));

        let buffer = render(&[row], &fields);
        let text = std::str::from_utf8(&buffer[3..]).unwrap();
        assert_eq!(text.lines().nth(1), Some("7,"));
    }
}

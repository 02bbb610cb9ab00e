//! Print-ready HTML rendering.
//!
//! The PDF download path serves a styled, self-contained HTML document
//! that browsers print cleanly. Every header and cell is escaped; row
//! data never reaches the markup raw.

use std::fmt::Write;

use crate::report::{ReportField, Row};

use super::cell_text;

/// Renders rows as a right-to-left HTML document titled `title`.
#[must_use]
pub fn render(rows: &[Row], fields: &[&ReportField], title: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html dir=\"rtl\" lang=\"ar\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n\
         body {{ font-family: 'Segoe UI', Tahoma, sans-serif; margin: 24px; }}\n\
         h1 {{ font-size: 18px; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #b0b7c3; padding: 6px 10px; text-align: right; }}\n\
         th {{ background: #2f5496; color: #ffffff; }}\n\
         tr:nth-child(even) td {{ background: #eef1f6; }}\n\
         </style>\n</head>\n<body>\n<h1>{title}</h1>\n<table>\n<thead><tr>",
        title = escape_html(title),
    );

    for field in fields {
        let _ = write!(out, "<th>{}</th>", escape_html(&field.display_name));
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in rows {
        out.push_str("<tr>");
        for field in fields {
            let text = row.get(&field.source_field).map(cell_text).unwrap_or_default();
            let _ = write!(out, "<td>{}</td>", escape_html(&text));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
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
    fn test_escape_covers_all_five_characters() {
        assert_eq!(
            escape_html("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_cell_markup_is_escaped() {
        let fields_owned = [field("notes", "Notes")];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();
        let mut row = Row::new();
        row.insert("notes".to_string(), json!("<script>alert(1)</script>"));

        let document = render(&[row], &fields, "report");

        assert!(!document.contains("<script>"));
        assert!(document.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_document_is_right_to_left() {
        let fields_owned = [field("amount", "Amount")];
        let fields: Vec<&ReportField> = fields_owned.iter().collect();

        let document = render(&[], &fields, "تقرير");

        assert!(document.contains("dir=\"rtl\""));
        assert!(document.contains("<th>Amount</th>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let document = render(&[], &[], "<img src=x>");
        assert!(document.contains("<title>&lt;img src=x&gt;</title>"));
    }
}

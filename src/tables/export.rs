//! Table exports.
//!
//! Every renderer is a pure function of a finalized `TableModel`.
//! `export_to_dir` is the only one touching the filesystem.

use std::fmt::Write as _;
use std::mem::take;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::TableModel;
use crate::download::save_bytes;
use crate::markdown;
use crate::text::escape_html;
use crate::{Error, Result};

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// RFC 4180 CSV.
    Csv,
    /// Excel 2003 XML spreadsheet.
    Excel,
    /// `{caption, headers, rows}` JSON.
    Json,
    /// GitHub Flavored Markdown table.
    Markdown,
    /// Standalone HTML document.
    Html,
    /// HTML page that opens the print dialog (save as PDF).
    Print,
}

impl ExportFormat {
    /// Every format.
    pub const ALL: [ExportFormat; 6] = [
        ExportFormat::Csv,
        ExportFormat::Excel,
        ExportFormat::Json,
        ExportFormat::Markdown,
        ExportFormat::Html,
        ExportFormat::Print,
    ];

    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Print => "print.html",
        }
    }

    /// Render `table` in this format.
    ///
    /// # Errors
    ///
    /// Only JSON rendering can fail (`Error::Serialization`).
    pub fn render(self, table: &TableModel) -> Result<String> {
        Ok(match self {
            ExportFormat::Csv => to_csv(table),
            ExportFormat::Excel => to_excel_xml(table),
            ExportFormat::Json => to_json(table)?,
            ExportFormat::Markdown => to_markdown(table),
            ExportFormat::Html => to_html_document(table),
            ExportFormat::Print => to_print_html(table),
        })
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xls" | "xml" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" => Ok(ExportFormat::Html),
            "print" | "pdf" => Ok(ExportFormat::Print),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

// === CSV ===

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_csv_row(out: &mut String, row: &[String]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

/// CSV with a header record; records end in CRLF.
#[must_use]
pub fn to_csv(table: &TableModel) -> String {
    let mut out = String::new();
    push_csv_row(&mut out, &table.headers);
    for row in &table.rows {
        push_csv_row(&mut out, row);
    }
    out
}

/// Parse RFC 4180 CSV into records.
///
/// Quoted fields may contain commas, doubled quotes and line breaks. CRLF and
/// LF line endings are both accepted; blank lines are skipped.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => record.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(take(&mut field));
                if record.len() == 1 && record[0].is_empty() {
                    record.clear();
                } else {
                    records.push(take(&mut record));
                }
            }
            c => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

// === Excel XML ===

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

fn worksheet_name(caption: &str) -> String {
    let name: String = caption
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    let name = name.trim();
    if name.is_empty() {
        "Sheet1".to_string()
    } else {
        name.to_string()
    }
}

fn is_number(cell: &str) -> bool {
    let trimmed = cell.trim();
    !trimmed.is_empty()
        && trimmed == cell
        && !(trimmed.len() > 1 && trimmed.starts_with('0') && !trimmed.starts_with("0."))
        && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Excel 2003 XML spreadsheet (`urn:schemas-microsoft-com:office:spreadsheet`).
#[must_use]
pub fn to_excel_xml(table: &TableModel) -> String {
    let mut out = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<?mso-application progid=\"Excel.Sheet\"?>\n",
        "<Workbook xmlns=\"urn:schemas-microsoft-com:office:spreadsheet\" ",
        "xmlns:ss=\"urn:schemas-microsoft-com:office:spreadsheet\">\n",
        " <Styles><Style ss:ID=\"header\"><Font ss:Bold=\"1\"/></Style></Styles>\n",
    ));
    let _ = writeln!(out, " <Worksheet ss:Name=\"{}\">", escape_xml(&worksheet_name(&table.caption)));
    out.push_str("  <Table>\n");

    out.push_str("   <Row>");
    for header in &table.headers {
        let _ = write!(
            out,
            "<Cell ss:StyleID=\"header\"><Data ss:Type=\"String\">{}</Data></Cell>",
            escape_xml(header)
        );
    }
    out.push_str("</Row>\n");

    for row in &table.rows {
        out.push_str("   <Row>");
        for cell in row {
            let kind = if is_number(cell) { "Number" } else { "String" };
            let _ = write!(out, "<Cell><Data ss:Type=\"{kind}\">{}</Data></Cell>", escape_xml(cell));
        }
        out.push_str("</Row>\n");
    }

    out.push_str("  </Table>\n </Worksheet>\n</Workbook>\n");
    out
}

// === JSON ===

#[derive(Serialize)]
struct JsonTable<'a> {
    caption: &'a str,
    headers: &'a [String],
    rows: &'a [Vec<String>],
}

/// Pretty JSON `{caption, headers, rows}`.
///
/// # Errors
///
/// `Error::Serialization` if serialization fails.
pub fn to_json(table: &TableModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonTable {
        caption: &table.caption,
        headers: &table.headers,
        rows: &table.rows,
    })?)
}

// === Markdown / HTML ===

/// Caption line followed by a pipe table.
#[must_use]
pub fn to_markdown(table: &TableModel) -> String {
    let mut out = String::new();
    if !table.caption.is_empty() {
        let _ = writeln!(out, "**{}**\n", markdown::escape_markdown(&table.caption));
    }
    out.push_str(&markdown::render_table(&table.headers, &table.rows));
    out
}

pub(crate) fn html_table(table: &TableModel) -> String {
    let mut out = String::from("<table>\n");
    if !table.caption.is_empty() {
        let _ = writeln!(out, "<caption>{}</caption>", escape_html(&table.caption));
    }
    out.push_str("<thead><tr>");
    for header in &table.headers {
        let _ = write!(out, "<th>{}</th>", escape_html(header));
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape_html(cell));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

const DOCUMENT_STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem}\
table{border-collapse:collapse}th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f3f3f3}caption{font-weight:bold;margin-bottom:.5rem}";

fn html_document(table: &TableModel, extra_head: &str, extra_body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{DOCUMENT_STYLE}</style>\n{extra_head}</head>\n<body>\n{}{extra_body}</body>\n</html>\n",
        escape_html(&table.caption),
        html_table(table),
    )
}

/// Standalone HTML document containing the table.
#[must_use]
pub fn to_html_document(table: &TableModel) -> String {
    html_document(table, "", "")
}

/// HTML document that opens the print dialog when loaded.
#[must_use]
pub fn to_print_html(table: &TableModel) -> String {
    html_document(
        table,
        "<style>@media print{body{margin:0}@page{size:landscape}}</style>\n",
        "<script>window.addEventListener('load',function(){window.print();});</script>\n",
    )
}

// === Files ===

/// File-name slug for a caption.
#[must_use]
pub fn slug(caption: &str) -> String {
    let mut out = String::new();
    for c in caption.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed: String = out.trim_end_matches('-').chars().take(40).collect();
    if trimmed.is_empty() {
        "table".to_string()
    } else {
        trimmed.trim_end_matches('-').to_string()
    }
}

/// `<slug>-<YYYYmmdd-HHMMSS>.<ext>`
#[must_use]
pub fn export_filename(table: &TableModel, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!("{}-{}.{}", slug(&table.caption), at.format("%Y%m%d-%H%M%S"), format.extension())
}

/// Render `table` and write it into `dir`, never overwriting.
///
/// # Errors
///
/// Rendering errors and `Error::Io`.
pub fn export_to_dir(dir: &Path, table: &TableModel, format: ExportFormat) -> Result<PathBuf> {
    let body = format.render(table)?;
    let name = export_filename(table, format, Utc::now());
    let path = save_bytes(dir, &name, body.as_bytes())?;
    info!(table = %table.id, path = %path.display(), "table exported");
    Ok(path)
}

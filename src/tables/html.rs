//! `<table>` detector.
//!
//! Headers come from the first `thead` row, else the first row. A header
//! cell with `colspan=n` becomes `n` labels (`Q`, `Q (2)`, ...); a data cell
//! with `colspan=n` repeats its text `n` times. `rowspan` is recorded and only
//! carried into later rows when `Options::propagate_rowspan` is set.

use dom_query::Selection;
use tracing::trace;

use super::{RowSpan, TableKind, TableModel};
use crate::dom::{self, NodeId};
use crate::options::Options;
use crate::page::Page;

/// Upper bound on cells read from one table.
const MAX_TABLE_CELLS: usize = 20_000;

/// Largest `colspan` honoured; larger values are clamped.
const MAX_COLSPAN: usize = 1000;

/// Largest `rowspan` honoured; larger values are clamped.
const MAX_ROWSPAN: usize = 65_534;

/// Parse a span attribute; missing, malformed and zero values mean 1,
/// values above `max` mean `max`.
fn span_attr(cell: &Selection, name: &str, max: usize) -> usize {
    dom::attr(cell, name)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map_or(1, |n| n.min(max))
}

/// Rows belonging to `table` itself, skipping rows of nested tables.
fn own_rows<'a>(table: &Selection<'a>) -> Vec<Selection<'a>> {
    let table_id = dom::node_id(table);
    dom::select_each(table, "tr")
        .into_iter()
        .filter(|tr| nearest_table(tr) == table_id)
        .collect()
}

fn nearest_table(sel: &Selection) -> Option<NodeId> {
    dom::ancestors(sel)
        .into_iter()
        .find(|a| dom::is_tag(a, "table"))
        .and_then(|t| dom::node_id(&t))
}

fn cells<'a>(row: &Selection<'a>) -> Vec<Selection<'a>> {
    dom::element_children(row)
        .into_iter()
        .filter(|c| dom::is_tag(c, "td") || dom::is_tag(c, "th"))
        .collect()
}

/// Header labels with colspan expansion.
#[must_use]
pub fn expand_header_row(row: &Selection) -> Vec<String> {
    let mut headers = Vec::new();
    for cell in cells(row) {
        let label = dom::clean_text(&cell);
        let span = span_attr(&cell, "colspan", MAX_COLSPAN);
        headers.push(label.clone());
        for n in 2..=span {
            headers.push(if label.is_empty() { String::new() } else { format!("{label} ({n})") });
        }
    }
    headers
}

/// Carries rowspan values into following rows.
#[derive(Debug, Default)]
struct RowspanCarry {
    pending: Vec<Option<(usize, String)>>,
}

impl RowspanCarry {
    fn fill(&mut self, row: &mut Vec<String>, col: &mut usize) {
        while *col < self.pending.len() {
            let Some((remaining, value)) = self.pending[*col].take() else {
                break;
            };
            row.push(value.clone());
            if remaining > 1 {
                self.pending[*col] = Some((remaining - 1, value));
            }
            *col += 1;
        }
    }

    fn hold(&mut self, col: usize, rows: usize, value: &str) {
        if self.pending.len() <= col {
            self.pending.resize_with(col + 1, || None);
        }
        self.pending[col] = Some((rows, value.to_string()));
    }
}

/// Data rows with colspan repetition, plus the spans that were declared.
fn read_data_rows(rows: &[Selection], propagate: bool) -> (Vec<Vec<String>>, Vec<RowSpan>) {
    let mut out = Vec::new();
    let mut spans = Vec::new();
    let mut carry = RowspanCarry::default();
    let mut total_cells = 0usize;
    let mut capped = false;

    for tr in rows {
        let mut row: Vec<String> = Vec::new();
        let mut col = 0usize;
        let row_index = out.len();

        for cell in cells(tr) {
            if propagate {
                carry.fill(&mut row, &mut col);
            }
            let text = dom::clean_text(&cell);
            let colspan = span_attr(&cell, "colspan", MAX_COLSPAN);
            let rowspan = span_attr(&cell, "rowspan", MAX_ROWSPAN);

            for i in 0..colspan {
                if total_cells >= MAX_TABLE_CELLS {
                    capped = true;
                    break;
                }
                total_cells += 1;
                if rowspan > 1 {
                    spans.push(RowSpan {
                        row: row_index,
                        column: col + i,
                        span: rowspan,
                    });
                    if propagate {
                        carry.hold(col + i, rowspan - 1, &text);
                    }
                }
                row.push(text.clone());
            }
            col += colspan;
            if capped {
                break;
            }
        }
        if propagate && !capped {
            carry.fill(&mut row, &mut col);
        }

        if row.iter().all(|c| c.is_empty()) {
            spans.retain(|s| s.row != row_index);
        } else {
            out.push(row);
        }
        if capped {
            trace!(total_cells, "table cell limit reached");
            break;
        }
    }

    (out, spans)
}

fn caption_of(table: &Selection, index: usize) -> String {
    let caption = dom::element_children(table)
        .into_iter()
        .find(|c| dom::is_tag(c, "caption"))
        .map(|c| dom::clean_text(&c))
        .filter(|c| !c.is_empty());
    caption
        .or_else(|| dom::attr(table, "aria-label"))
        .or_else(|| dom::attr(table, "title"))
        .unwrap_or_else(|| format!("Table {index}"))
}

/// Read one `<table>`; `None` when it has too few rows.
#[must_use]
pub fn read_table(table: &Selection, index: usize, options: &Options) -> Option<TableModel> {
    let rows = own_rows(table);
    if rows.len() < options.min_table_rows.max(2) {
        return None;
    }

    let in_thead = |tr: &Selection| dom::parent_tag(tr).is_some_and(|t| t == "thead");
    let header_pos = rows.iter().position(in_thead).unwrap_or(0);
    let headers = expand_header_row(&rows[header_pos]);

    let data: Vec<Selection> = rows
        .iter()
        .enumerate()
        .filter(|(i, tr)| *i != header_pos && !in_thead(*tr))
        .map(|(_, tr)| tr.clone())
        .collect();
    let (data_rows, rowspans) = read_data_rows(&data, options.propagate_rowspan);

    let mut model = TableModel::new(format!("table-{index}"), caption_of(table, index), TableKind::Html, headers);
    model.rows = data_rows;
    model.rowspans = rowspans;
    Some(model)
}

/// Every qualifying `<table>` of the page, in document order.
#[must_use]
pub fn detect(page: &Page, options: &Options) -> Vec<TableModel> {
    let mut out = Vec::new();
    for table in dom::select_each(&page.document().select("html"), "table") {
        if options.check_visibility && !page.is_visible(&table) {
            continue;
        }
        if let Some(model) = read_table(&table, out.len() + 1, options) {
            out.push(model);
        }
    }
    out
}

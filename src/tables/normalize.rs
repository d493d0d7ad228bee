//! Table normalization and merging.

use std::collections::HashMap;

use super::{RowSpan, TableModel};
use crate::text;

/// Lowercase, pipe-joined header labels.
#[must_use]
pub fn header_signature(headers: &[String]) -> String {
    headers.iter().map(|h| h.to_lowercase()).collect::<Vec<_>>().join("|")
}

/// Normalize a detected table.
///
/// - header and cell text is whitespace-collapsed
/// - every row is padded or truncated to the header count
/// - an empty header over an all-empty column is dropped with its column;
///   an empty header over data becomes `Column N`
/// - rows left entirely empty are dropped
///
/// Returns `None` when no header survives. Normalizing a normalized table
/// returns it unchanged.
#[must_use]
pub fn normalize(mut table: TableModel) -> Option<TableModel> {
    let headers: Vec<String> = table.headers.iter().map(|h| text::clean_text(h)).collect();
    let width = headers.len();

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().take(width).map(|c| text::clean_text(c)).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    let keep: Vec<bool> = (0..width)
        .map(|col| !headers[col].is_empty() || rows.iter().any(|r| !r[col].is_empty()))
        .collect();
    let column_map: Vec<Option<usize>> = keep
        .iter()
        .scan(0usize, |next, kept| {
            Some(kept.then(|| {
                *next += 1;
                *next - 1
            }))
        })
        .collect();

    let new_headers: Vec<String> = headers
        .into_iter()
        .zip(&column_map)
        .filter_map(|(header, slot)| {
            slot.map(|i| if header.is_empty() { format!("Column {}", i + 1) } else { header })
        })
        .collect();
    if new_headers.is_empty() {
        return None;
    }

    let mut row_map: Vec<Option<usize>> = Vec::with_capacity(rows.len());
    let mut new_rows: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for row in rows {
        let cells: Vec<String> = row
            .into_iter()
            .zip(&keep)
            .filter_map(|(cell, kept)| kept.then_some(cell))
            .collect();
        if cells.iter().all(String::is_empty) {
            row_map.push(None);
        } else {
            row_map.push(Some(new_rows.len()));
            new_rows.push(cells);
        }
    }

    table.rowspans = table
        .rowspans
        .iter()
        .filter_map(|span| {
            let row = (*row_map.get(span.row)?)?;
            let column = (*column_map.get(span.column)?)?;
            Some(RowSpan {
                row,
                column,
                span: span.span,
            })
        })
        .collect();
    table.caption = text::clean_text(&table.caption);
    table.headers = new_headers;
    table.rows = new_rows;
    Some(table)
}

/// Merge tables whose header signatures are identical.
///
/// Output order follows the first table of each signature; rows are
/// concatenated in discovery order. A merged table takes the first
/// contributor's headers and is renamed to reflect the merge.
#[must_use]
pub fn merge_tables(tables: Vec<TableModel>) -> Vec<TableModel> {
    let mut out: Vec<TableModel> = Vec::new();
    let mut by_signature: HashMap<String, usize> = HashMap::new();

    for table in tables {
        let signature = table.signature();
        let Some(&slot) = by_signature.get(&signature) else {
            by_signature.insert(signature, out.len());
            out.push(table);
            continue;
        };

        let target = &mut out[slot];
        let offset = target.rows.len();
        target.rowspans.extend(table.rowspans.into_iter().map(|s| RowSpan {
            row: s.row + offset,
            ..s
        }));
        target.rows.extend(table.rows);
        target.merged_from += table.merged_from;
    }

    for table in out.iter_mut().filter(|t| t.merged_from > 1) {
        let base_id = table.id.split('+').next().unwrap_or_default().to_string();
        table.id = format!("{base_id}+merged");
        let base_caption = table.caption.split(" (merged from").next().unwrap_or_default().to_string();
        table.caption = format!("{base_caption} (merged from {} tables)", table.merged_from);
    }

    out
}

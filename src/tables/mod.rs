//! Table detection, normalization, merging and export.
//!
//! Three detectors run independently and their outputs are concatenated in
//! discovery order before post-processing:
//!
//! - [`html`]: real `<table>` elements
//! - [`visual`]: div/ARIA look-alikes and definition lists
//!
//! Post-processing is [`normalize`] followed, when enabled, by
//! [`merge_tables`]. Exports in [`export`] are pure functions over a
//! finalized `TableModel`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::finders::{Finder, FinderKind};
use crate::options::Options;
use crate::page::Page;

pub mod export;
pub mod html;
pub mod normalize;
pub mod visual;

pub use export::{export_to_dir, parse_csv, ExportFormat};
pub use normalize::{header_signature, merge_tables, normalize};

/// Which detector produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// `<table>` element.
    Html,
    /// Div grid recognised by class names.
    Div,
    /// Element with `role="table"` or `role="grid"`.
    Aria,
    /// `<dl>` definition list.
    List,
}

impl TableKind {
    /// Serialized name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TableKind::Html => "html",
            TableKind::Div => "div",
            TableKind::Aria => "aria",
            TableKind::List => "list",
        }
    }
}

/// A cell spanning more than one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    /// Data row index of the spanning cell.
    pub row: usize,
    /// Column index of the spanning cell.
    pub column: usize,
    /// Declared `rowspan`.
    pub span: usize,
}

/// A detected table.
///
/// After [`normalize`] every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    /// Discovery id (`table-1`, `div-table-2`, ...).
    pub id: String,
    /// Caption, or a generated label.
    pub caption: String,
    /// Detector that found the table.
    pub kind: TableKind,
    /// Column headers.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
    /// Number of detected tables folded into this one.
    pub merged_from: usize,
    /// Row-spanning cells, as declared.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rowspans: Vec<RowSpan>,
}

impl TableModel {
    /// A table with no rows yet.
    pub fn new(id: impl Into<String>, caption: impl Into<String>, kind: TableKind, headers: Vec<String>) -> Self {
        Self {
            id: id.into(),
            caption: caption.into(),
            kind,
            headers,
            rows: Vec::new(),
            merged_from: 1,
            rowspans: Vec::new(),
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Lowercase, pipe-joined header labels.
    #[must_use]
    pub fn signature(&self) -> String {
        header_signature(&self.headers)
    }
}

/// Finds the tables of a page.
#[derive(Debug, Clone, Default)]
pub struct TableFinder {
    options: Options,
}

impl TableFinder {
    /// Finder configured from `options`.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
        }
    }

    /// Detected tables before normalization and merging.
    #[must_use]
    pub fn detect(&self, page: &Page) -> Vec<TableModel> {
        let mut tables = html::detect(page, &self.options);
        tables.extend(visual::detect(page, &self.options));
        tables.extend(visual::detect_definition_lists(page, &self.options));
        tables
    }
}

impl Finder for TableFinder {
    type Output = Vec<TableModel>;
    const KIND: FinderKind = FinderKind::Tables;

    fn find(&self, page: &Page) -> Vec<TableModel> {
        let detected = self.detect(page);
        let found = detected.len();
        let normalized: Vec<TableModel> = detected.into_iter().filter_map(normalize).collect();
        let tables = if self.options.merge_tables {
            merge_tables(normalized)
        } else {
            normalized
        };
        debug!(found, kept = tables.len(), "table scan complete");
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_concatenates_detectors_and_merges() {
        let page = Page::from_html(
            r#"<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>31</td></tr></table>
               <div role="table">
                 <div role="row"><div role="columnheader">name</div><div role="columnheader">AGE</div></div>
                 <div role="row"><div role="cell">Bob</div><div role="cell">42</div></div>
               </div>
               <dl><dt>Speed</dt><dd>Fast</dd><dt>Weight</dt><dd>Light</dd></dl>"#,
            None,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let tables = TableFinder::default().find(&page);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].merged_from, 2);
        assert_eq!(tables[0].rows, vec![vec!["Ann", "31"], vec!["Bob", "42"]]);
        assert_eq!(tables[1].kind, TableKind::List);
    }

    #[test]
    fn test_merge_can_be_disabled() {
        let html = "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>\
                    <table><tr><th>A</th></tr><tr><td>2</td></tr></table>";
        let page = Page::from_html(html, None).unwrap_or_else(|e| panic!("{e}"));
        let options = Options {
            merge_tables: false,
            ..Options::default()
        };
        assert_eq!(TableFinder::new(&options).find(&page).len(), 2);
        assert_eq!(TableFinder::default().find(&page).len(), 1);
    }
}

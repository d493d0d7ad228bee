//! Look-alike table detector.
//!
//! Containers, rows, cells and header rows are each recognised by a list of
//! pure predicates or strategies tried in priority order. The first container
//! predicate that matches decides the `TableKind`; the first row or cell
//! strategy yielding more than one element wins.

use std::collections::HashSet;

use dom_query::Selection;
use tracing::trace;

use super::{TableKind, TableModel};
use crate::dom::{self, NodeId};
use crate::options::Options;
use crate::page::Page;
use crate::patterns::{HEADER_ROW_CLASS, TABLE_CLASS_HINTS, TABLE_PART_CLASS};
use crate::style;

/// Element predicate.
pub type Predicate = fn(&Selection) -> bool;

/// Header-row predicate over the first row and the row after it.
pub type HeaderPredicate = fn(&Selection, Option<&Selection>) -> bool;

/// Strategy returning candidate child elements.
pub type Strategy = for<'a> fn(&Selection<'a>) -> Vec<Selection<'a>>;

/// Container predicates, in priority order.
pub const CONTAINER_PREDICATES: &[(TableKind, Predicate)] =
    &[(TableKind::Aria, has_table_role), (TableKind::Div, has_table_class)];

/// Row strategies, in priority order.
pub const ROW_STRATEGIES: &[(&str, Strategy)] =
    &[("aria-rows", aria_rows), ("row-class", row_class_children), ("children", dom::element_children)];

/// Cell strategies, in priority order.
pub const CELL_STRATEGIES: &[(&str, Strategy)] =
    &[("aria-cells", aria_cells), ("cell-class", cell_class_children), ("children", dom::element_children)];

/// Header-row predicates, in priority order.
pub const HEADER_PREDICATES: &[(&str, HeaderPredicate)] = &[
    ("aria-columnheader", has_column_headers),
    ("header-class", has_header_class),
    ("bold", is_bolder_than_next),
    ("background", has_distinct_background),
];

/// `role="table"`, `role="grid"` or `role="treegrid"`.
#[must_use]
pub fn has_table_role(sel: &Selection) -> bool {
    dom::attr(sel, "role").is_some_and(|r| matches!(r.to_ascii_lowercase().as_str(), "table" | "grid" | "treegrid"))
}

/// A class token containing a table hint that does not name a table part.
#[must_use]
pub fn has_table_class(sel: &Selection) -> bool {
    dom::class_tokens(sel).iter().any(|token| {
        let lower = token.to_ascii_lowercase();
        TABLE_CLASS_HINTS.iter().any(|hint| lower.contains(hint)) && !TABLE_PART_CLASS.is_match(&lower)
    })
}

fn aria_rows<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    dom::select_each(sel, r#"[role="row"]"#)
}

fn row_class_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    dom::element_children(sel)
        .into_iter()
        .filter(|c| {
            dom::class_tokens(c).iter().any(|t| {
                let t = t.to_ascii_lowercase();
                t == "tr" || t.contains("row")
            })
        })
        .collect()
}

fn aria_cells<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    dom::select_each(
        sel,
        r#"[role="cell"], [role="gridcell"], [role="columnheader"], [role="rowheader"]"#,
    )
}

fn cell_class_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    dom::element_children(sel)
        .into_iter()
        .filter(|c| {
            dom::class_tokens(c).iter().any(|t| {
                let t = t.to_ascii_lowercase();
                t == "td" || t == "th" || t.contains("cell") || t.contains("col")
            })
        })
        .collect()
}

/// First strategy yielding more than one element, with its name.
fn first_strategy<'a>(
    sel: &Selection<'a>,
    strategies: &[(&'static str, Strategy)],
) -> Option<(&'static str, Vec<Selection<'a>>)> {
    strategies.iter().find_map(|(name, strategy)| {
        let found = strategy(sel);
        (found.len() > 1).then_some((*name, found))
    })
}

/// Cell texts of a row; a row no strategy can split is one cell.
fn row_cells(row: &Selection) -> Vec<String> {
    match first_strategy(row, CELL_STRATEGIES) {
        Some((_, cells)) => cells.iter().map(dom::clean_text).collect(),
        None => vec![dom::clean_text(row)],
    }
}

fn has_column_headers(first: &Selection, _next: Option<&Selection>) -> bool {
    first.select(r#"[role="columnheader"]"#).exists()
}

fn has_header_class(first: &Selection, _next: Option<&Selection>) -> bool {
    dom::class_tokens(first).iter().any(|t| HEADER_ROW_CLASS.is_match(t))
}

fn inline_value(sel: &Selection, property: &str) -> Option<String> {
    let decls = style::parse_declarations(&dom::attr(sel, "style")?);
    style::declaration(&decls, property).map(|v| v.to_ascii_lowercase())
}

fn is_bold_value(value: &str) -> bool {
    matches!(value, "bold" | "bolder") || value.parse::<u32>().is_ok_and(|w| w >= 600)
}

/// Whether a row reads as bold: inline `font-weight`, or every cell wrapped
/// in `th`, `b` or `strong`.
fn looks_bold(row: &Selection) -> bool {
    if inline_value(row, "font-weight").is_some_and(|v| is_bold_value(&v)) {
        return true;
    }
    let cells = first_strategy(row, CELL_STRATEGIES).map(|(_, c)| c).unwrap_or_default();
    !cells.is_empty()
        && cells.iter().all(|cell| {
            inline_value(cell, "font-weight").is_some_and(|v| is_bold_value(&v))
                || dom::is_tag(cell, "th")
                || cell.select("b, strong").exists()
        })
}

fn is_bolder_than_next(first: &Selection, next: Option<&Selection>) -> bool {
    looks_bold(first) && !next.is_some_and(looks_bold)
}

fn has_distinct_background(first: &Selection, next: Option<&Selection>) -> bool {
    let first_bg = inline_value(first, "background-color").or_else(|| inline_value(first, "background"));
    let next_bg = next.and_then(|n| inline_value(n, "background-color").or_else(|| inline_value(n, "background")));
    first_bg.is_some() && first_bg != next_bg
}

/// Name of the first header predicate that accepts `first` as a header row.
#[must_use]
pub fn header_evidence(first: &Selection, next: Option<&Selection>) -> Option<&'static str> {
    HEADER_PREDICATES
        .iter()
        .find(|(_, predicate)| predicate(first, next))
        .map(|(name, _)| *name)
}

fn caption_of(sel: &Selection, fallback: String) -> String {
    dom::attr(sel, "aria-label")
        .or_else(|| dom::attr(sel, "title"))
        .unwrap_or(fallback)
}

/// Read one look-alike container.
#[must_use]
pub fn read_container(container: &Selection, kind: TableKind, index: usize, options: &Options) -> Option<TableModel> {
    let (row_strategy, rows) = first_strategy(container, ROW_STRATEGIES)?;
    if rows.len() < options.min_table_rows.max(2) {
        return None;
    }

    let evidence = header_evidence(&rows[0], rows.get(1));
    let mut cell_rows: Vec<Vec<String>> = rows.iter().map(row_cells).collect();

    let headers = if evidence.is_some() {
        cell_rows.remove(0)
    } else {
        let width = cell_rows.iter().map(Vec::len).max().unwrap_or(0);
        (1..=width).map(|n| format!("Column {n}")).collect()
    };
    if headers.len() < 2 {
        return None;
    }

    // Layout grids rarely keep a consistent column count
    let consistent = cell_rows.iter().filter(|r| r.len() == headers.len()).count();
    if consistent * 2 < cell_rows.len() {
        trace!(index, "container rows are not tabular");
        return None;
    }

    trace!(index, row_strategy, header = ?evidence, "look-alike table detected");
    let prefix = match kind {
        TableKind::Aria => "aria-table",
        _ => "div-table",
    };
    let mut model = TableModel::new(
        format!("{prefix}-{index}"),
        caption_of(container, format!("Grid {index}")),
        kind,
        headers,
    );
    model.rows = cell_rows;
    Some(model)
}

/// Every look-alike table of the page. Containers inside or around a real
/// `<table>`, or inside an accepted container, are skipped.
#[must_use]
pub fn detect(page: &Page, options: &Options) -> Vec<TableModel> {
    let mut accepted: HashSet<NodeId> = HashSet::new();
    let mut out = Vec::new();

    for el in dom::all_elements(page.document()) {
        let Some(kind) = CONTAINER_PREDICATES
            .iter()
            .find(|(_, predicate)| predicate(&el))
            .map(|(kind, _)| *kind)
        else {
            continue;
        };
        if dom::is_tag(&el, "table") || dom::has_ancestor_tag(&el, &["table"]) || el.select("table").exists() {
            continue;
        }
        let inside_accepted = dom::ancestors(&el)
            .iter()
            .filter_map(dom::node_id)
            .any(|id| accepted.contains(&id));
        if inside_accepted || (options.check_visibility && !page.is_visible(&el)) {
            continue;
        }
        if let Some(model) = read_container(&el, kind, out.len() + 1, options) {
            if let Some(id) = dom::node_id(&el) {
                accepted.insert(id);
            }
            out.push(model);
        }
    }

    out
}

/// `<dl>` elements with enough term/definition pairs.
#[must_use]
pub fn detect_definition_lists(page: &Page, options: &Options) -> Vec<TableModel> {
    let mut out = Vec::new();

    for dl in dom::select_each(&page.document().select("html"), "dl") {
        if dom::has_ancestor_tag(&dl, &["dl"]) || (options.check_visibility && !page.is_visible(&dl)) {
            continue;
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut term: Option<String> = None;
        for item in dom::select_each(&dl, "dt, dd") {
            if dom::has_ancestor_tag(&item, &["dd"]) {
                continue;
            }
            if dom::is_tag(&item, "dt") {
                term = Some(dom::clean_text(&item));
            } else if let Some(t) = &term {
                rows.push(vec![t.clone(), dom::clean_text(&item)]);
            }
        }
        if rows.len() < options.min_table_rows.max(2) {
            continue;
        }

        let index = out.len() + 1;
        let mut model = TableModel::new(
            format!("list-{index}"),
            caption_of(&dl, format!("Definition list {index}")),
            TableKind::List,
            vec!["Term".to_string(), "Definition".to_string()],
        );
        model.rows = rows;
        out.push(model);
    }

    out
}

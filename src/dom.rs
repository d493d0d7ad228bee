//! DOM Access Adapter
//!
//! Thin helpers over the `dom_query` crate giving the finders a small,
//! read-mostly vocabulary: attributes, tag names, ancestry and child
//! elements. Writes are limited to injecting overlay markup.

// Re-export core types for external use
pub use dom_query::{Document, NodeId, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Parsing ===

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Attribute Operations ===

/// Get any attribute value, trimmed; `None` if missing or blank.
#[must_use]
pub fn attr(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an attribute value or the empty string.
#[inline]
#[must_use]
pub fn attr_or_empty(sel: &Selection, name: &str) -> String {
    attr(sel, name).unwrap_or_default()
}

/// Check if an attribute exists (even when empty).
#[inline]
#[must_use]
pub fn has_attribute(sel: &Selection, name: &str) -> bool {
    sel.has_attr(name)
}

/// Parse a numeric attribute such as `width="120"` or `width="120px"`.
#[must_use]
pub fn numeric_attr(sel: &Selection, name: &str) -> Option<u32> {
    let raw = attr(sel, name)?;
    let digits: String = raw.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Class attribute split into tokens.
#[must_use]
pub fn class_tokens(sel: &Selection) -> Vec<String> {
    attr_or_empty(sel, "class")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// === Tag/Node Information ===

/// Get tag name (lowercase).
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(dom_query::NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Check the tag name of the first node in the selection.
#[must_use]
pub fn is_tag(sel: &Selection, tag: &str) -> bool {
    tag_name(sel).is_some_and(|t| t == tag)
}

/// Tag name of the parent element.
#[must_use]
pub fn parent_tag(sel: &Selection) -> Option<String> {
    tag_name(&sel.parent())
}

/// Stable identity of the first node in the selection.
#[must_use]
pub fn node_id(sel: &Selection) -> Option<NodeId> {
    sel.nodes().first().map(|n| n.id)
}

// === Tree Navigation ===

/// Element ancestors, nearest first. Stops before the document node.
#[must_use]
pub fn ancestors<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    let mut out = Vec::new();
    let mut current = sel.parent();

    while current.exists() {
        if tag_name(&current).is_none() {
            break;
        }
        out.push(current.clone());
        current = current.parent();
    }

    out
}

/// Check whether any ancestor has one of the given tag names.
#[must_use]
pub fn has_ancestor_tag(sel: &Selection, tags: &[&str]) -> bool {
    ancestors(sel)
        .iter()
        .any(|a| tag_name(a).is_some_and(|t| tags.contains(&t.as_str())))
}

/// Direct element children as individual selections.
#[must_use]
pub fn element_children<'a>(sel: &Selection<'a>) -> Vec<Selection<'a>> {
    sel.children()
        .nodes()
        .iter()
        .filter(|n| n.is_element())
        .map(|n| Selection::from(*n))
        .collect()
}

/// Every node matched by `selector` as an individual selection.
#[must_use]
pub fn select_each<'a>(sel: &Selection<'a>, selector: &str) -> Vec<Selection<'a>> {
    sel.select(selector)
        .nodes()
        .iter()
        .map(|n| Selection::from(*n))
        .collect()
}

/// Every element of the document, in document order.
#[must_use]
pub fn all_elements(doc: &Document) -> Vec<Selection<'_>> {
    doc.select("*")
        .nodes()
        .iter()
        .map(|n| Selection::from(*n))
        .collect()
}

// === Text Content ===

/// All text of the node and its descendants, whitespace-collapsed.
#[must_use]
pub fn clean_text(sel: &Selection) -> String {
    crate::text::clean_text(&sel.text())
}

/// Outer HTML of the selection.
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Inner HTML of the selection.
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

// === Tree Manipulation ===

/// Append HTML content.
#[inline]
pub fn append_html(sel: &Selection, html: &str) {
    sel.append_html(html);
}

/// Remove elements from the tree.
#[inline]
pub fn remove(sel: &Selection) {
    sel.remove();
}

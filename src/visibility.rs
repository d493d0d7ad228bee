//! Visibility check.
//!
//! An element is visible when neither it nor any ancestor is hidden by its
//! markup: inline `display:none`, `visibility:hidden|collapse`, `opacity:0`,
//! a zero-sized box, the `hidden` attribute or `<input type=hidden>`.
//!
//! Unconditional `<style>` rules setting `display:none` or
//! `visibility:hidden|collapse` hide the elements they match as well, unless
//! the element's own `style` attribute sets the same property.
//! [`StylesheetVisibility`] collects those elements once per document;
//! `Page::is_visible` combines both checks.

use std::collections::HashMap;

use dom_query::{Document, NodeId, Selection};
use tracing::trace;

use crate::dom;
use crate::style;

/// Why an element failed the visibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hidden {
    /// `display: none` or the `hidden` attribute.
    NotDisplayed,
    /// `visibility: hidden` or `collapse`.
    Invisible,
    /// `opacity: 0`.
    Transparent,
    /// Zero width or height.
    ZeroSize,
}

/// Check whether `sel` itself hides its box; ancestors are not consulted.
#[must_use]
pub fn own_hidden_reason(sel: &Selection) -> Option<Hidden> {
    if dom::has_attribute(sel, "hidden") {
        return Some(Hidden::NotDisplayed);
    }
    if dom::is_tag(sel, "input")
        && dom::attr(sel, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return Some(Hidden::NotDisplayed);
    }
    if dom::numeric_attr(sel, "width") == Some(0) || dom::numeric_attr(sel, "height") == Some(0) {
        return Some(Hidden::ZeroSize);
    }

    let inline = dom::attr(sel, "style")?;
    let decls = style::parse_declarations(&inline);
    let value = |prop: &str| style::declaration(&decls, prop).map(|v| v.to_ascii_lowercase());

    if value("display").is_some_and(|v| v == "none") {
        return Some(Hidden::NotDisplayed);
    }
    if value("visibility").is_some_and(|v| v == "hidden" || v == "collapse") {
        return Some(Hidden::Invisible);
    }
    if value("opacity").and_then(|v| v.parse::<f32>().ok()).is_some_and(|o| o <= 0.0) {
        return Some(Hidden::Transparent);
    }
    if value("width").is_some_and(|v| is_zero_length(&v))
        || value("height").is_some_and(|v| is_zero_length(&v))
    {
        return Some(Hidden::ZeroSize);
    }

    None
}

fn is_zero_length(value: &str) -> bool {
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number.parse::<f32>().is_ok_and(|n| n == 0.0)
}

/// Reason the element or one of its ancestors is hidden, if any.
#[must_use]
pub fn hidden_reason(sel: &Selection) -> Option<Hidden> {
    own_hidden_reason(sel).or_else(|| dom::ancestors(sel).iter().find_map(own_hidden_reason))
}

/// Markup-only visibility predicate; stylesheet rules are not consulted.
#[must_use]
pub fn is_visible(sel: &Selection) -> bool {
    hidden_reason(sel).is_none()
}

/// Elements hidden by the document's `<style>` rules.
#[derive(Debug, Clone, Default)]
pub struct StylesheetVisibility {
    hidden: HashMap<NodeId, Hidden>,
}

impl StylesheetVisibility {
    /// Match every hiding rule of every `<style>` block against `doc`.
    ///
    /// Rules inside `@media`/`@supports` groups and rules targeting
    /// pseudo-elements are ignored. Selectors `dom_query` cannot parse match
    /// nothing.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut hidden = HashMap::new();

        for sheet in dom::select_each(&doc.select("html"), "style") {
            for rule in style::parse_stylesheet(&sheet.text()) {
                if rule.conditional || rule.targets_pseudo_element() {
                    continue;
                }
                let Some(reason) = rule_hides(&rule.declarations) else {
                    continue;
                };
                let Some(matched) = doc.try_select(&rule.selector) else {
                    trace!(selector = %rule.selector, "unsupported selector in stylesheet");
                    continue;
                };
                for node in matched.nodes() {
                    hidden.entry(node.id).or_insert(reason);
                }
            }
        }

        Self { hidden }
    }

    /// Reason a stylesheet rule hides `sel` itself, if any.
    #[must_use]
    pub fn own_reason(&self, sel: &Selection) -> Option<Hidden> {
        let reason = *self.hidden.get(&dom::node_id(sel)?)?;
        let property = match reason {
            Hidden::Invisible => "visibility",
            _ => "display",
        };
        let overridden = dom::attr(sel, "style")
            .is_some_and(|inline| style::declaration(&style::parse_declarations(&inline), property).is_some());
        (!overridden).then_some(reason)
    }

    /// Number of elements hidden by stylesheet rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hidden.len()
    }

    /// Whether no stylesheet rule hides anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
    }
}

/// First token of a declaration value, lowercased (drops `!important`).
fn keyword(declarations: &[(String, String)], property: &str) -> Option<String> {
    style::declaration(declarations, property)
        .and_then(|v| v.split_whitespace().next().map(str::to_ascii_lowercase))
}

fn rule_hides(declarations: &[(String, String)]) -> Option<Hidden> {
    if keyword(declarations, "display").is_some_and(|v| v == "none") {
        return Some(Hidden::NotDisplayed);
    }
    if keyword(declarations, "visibility").is_some_and(|v| v == "hidden" || v == "collapse") {
        return Some(Hidden::Invisible);
    }
    None
}

/// Reason the element or an ancestor is hidden, by markup or by stylesheet.
#[must_use]
pub fn hidden_reason_with(sel: &Selection, sheets: &StylesheetVisibility) -> Option<Hidden> {
    let own = |s: &Selection| own_hidden_reason(s).or_else(|| sheets.own_reason(s));
    own(sel).or_else(|| dom::ancestors(sel).iter().find_map(own))
}

//! Inline style and stylesheet scanning.
//!
//! Snapshots carry no computed style, so CSS-provided images are read from
//! `style` attributes and from the rules of `<style>` blocks.

use crate::patterns::{CSS_COMMENT, CSS_PSEUDO_ELEMENT, CSS_URL, IMAGE_CSS_PROPERTIES};

/// A style rule from a `<style>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// Selector list as written.
    pub selector: String,
    /// Declarations in source order, property names lowercased.
    pub declarations: Vec<(String, String)>,
    /// Whether the rule sits inside `@media`, `@supports` or another
    /// conditional group.
    pub conditional: bool,
}

impl CssRule {
    /// Whether the rule targets `::before` or `::after`.
    #[must_use]
    pub fn targets_pseudo_element(&self) -> bool {
        CSS_PSEUDO_ELEMENT.is_match(&self.selector)
    }

    /// Selector with pseudo-elements removed, suitable for matching elements.
    #[must_use]
    pub fn element_selector(&self) -> String {
        CSS_PSEUDO_ELEMENT.replace_all(&self.selector, "").trim().to_string()
    }
}

/// Split `text` on `sep`, ignoring separators inside quotes or parentheses.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse a declaration block (`a: b; c: d`) into property/value pairs.
///
/// Semicolons inside `url(...)` (as in `data:` URLs) do not split.
#[must_use]
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().trim_end_matches("!important").trim().to_string();
            (!prop.is_empty() && !value.is_empty()).then_some((prop, value))
        })
        .collect()
}

/// Value of the last declaration of `property` (later declarations win).
#[must_use]
pub fn declaration(declarations: &[(String, String)], property: &str) -> Option<String> {
    declarations
        .iter()
        .rev()
        .find(|(p, _)| p == property)
        .map(|(_, v)| v.clone())
}

/// Every `url(...)` value in `value`, in source order.
#[must_use]
pub fn extract_urls(value: &str) -> Vec<String> {
    CSS_URL
        .captures_iter(value)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim().to_string())
        })
        .filter(|u| !u.is_empty())
        .collect()
}

/// Image URLs carried by image-bearing properties of a declaration list.
#[must_use]
pub fn image_urls(declarations: &[(String, String)]) -> Vec<String> {
    declarations
        .iter()
        .filter(|(prop, _)| IMAGE_CSS_PROPERTIES.contains(&prop.as_str()))
        .flat_map(|(_, value)| extract_urls(value))
        .collect()
}

/// Parse a stylesheet into flat style rules.
///
/// Conditional group rules (`@media`, `@supports`, `@layer`) are descended
/// into; other at-rules such as `@font-face` and `@keyframes` are skipped.
#[must_use]
pub fn parse_stylesheet(css: &str) -> Vec<CssRule> {
    let css = CSS_COMMENT.replace_all(css, "");
    let mut rules = Vec::new();
    collect_rules(&css, false, &mut rules);
    rules
}

fn collect_rules(css: &str, conditional: bool, out: &mut Vec<CssRule>) {
    let mut rest = css;

    while let Some(open) = rest.find('{') {
        let prelude = rest[..open].trim();
        let Some(close) = matching_brace(rest, open) else {
            break;
        };
        let body = &rest[open + 1..close];

        // Statement at-rules (`@import ...;`) may precede the prelude
        let prelude = prelude.rsplit(';').next().unwrap_or(prelude).trim();

        if let Some(at_rule) = prelude.strip_prefix('@') {
            let name = at_rule.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
            if matches!(name.as_str(), "media" | "supports" | "layer" | "container" | "document") {
                collect_rules(body, conditional || name != "layer", out);
            }
        } else if !prelude.is_empty() {
            out.push(CssRule {
                selector: prelude.to_string(),
                declarations: parse_declarations(body),
                conditional,
            });
        }

        rest = &rest[close + 1..];
    }
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations_keeps_data_urls_whole() {
        let decls = parse_declarations(
            "color: red; background-image: url(data:image/png;base64,AAAA); DISPLAY:none !important",
        );
        assert_eq!(decls.len(), 3);
        assert_eq!(
            declaration(&decls, "background-image").as_deref(),
            Some("url(data:image/png;base64,AAAA)")
        );
        assert_eq!(declaration(&decls, "display").as_deref(), Some("none"));
    }

    #[test]
    fn test_later_declaration_wins() {
        let decls = parse_declarations("display:none; display:block");
        assert_eq!(declaration(&decls, "display").as_deref(), Some("block"));
    }

    #[test]
    fn test_image_urls_only_from_image_properties() {
        let decls = parse_declarations(
            "background: #fff url('/bg.png') no-repeat; src: url(font.woff); cursor: url(c.cur), auto",
        );
        assert_eq!(image_urls(&decls), vec!["/bg.png".to_string(), "c.cur".to_string()]);
    }

    #[test]
    fn test_parse_stylesheet_descends_media_and_skips_font_face() {
        let css = r#"
            /* header art */
            .hero { background-image: url("/hero.jpg"); }
            @font-face { font-family: X; src: url(x.woff); }
            @media (min-width: 600px) {
                .card::before { content: url(/icon.svg); }
            }
        "#;
        let rules = parse_stylesheet(css);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, ".hero");
        assert!(!rules[0].targets_pseudo_element());
        assert!(rules[1].targets_pseudo_element());
        assert_eq!(rules[1].element_selector(), ".card");
        assert!(!rules[0].conditional);
        assert!(rules[1].conditional);
    }

    #[test]
    fn test_layer_rules_stay_unconditional() {
        let rules = parse_stylesheet("@layer base { .a { display: none; } } @supports (x: y) { .b { color: red; } }");
        assert_eq!(rules.len(), 2);
        assert!(!rules[0].conditional);
        assert!(rules[1].conditional);
    }

    #[test]
    fn test_parse_stylesheet_tolerates_unbalanced_input() {
        let rules = parse_stylesheet(".a { color: red; } .b { background: url(x.png)");
        assert_eq!(rules.len(), 1);
    }
}

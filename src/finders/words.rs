//! Visible word counter and its overlay badge.
//!
//! A snapshot has no viewport, so every visible text node of the body is
//! counted. Recomputation in response to scroll, resize and mutation events
//! is coalesced by a trailing debounce in `WordCountMonitor`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use dom_query::{NodeId, Selection};
use tracing::{debug, warn};

use crate::debounce::Debouncer;
use crate::dom;
use crate::options::Options;
use crate::page::Page;
use crate::text;

/// Element id of the injected badge.
pub const BADGE_ID: &str = "page-inspector-word-badge";

/// Elements whose text never counts.
const UNCOUNTED_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title", "svg"];

/// Counts the words a reader can see.
#[derive(Debug, Clone, Default)]
pub struct WordCounter;

impl WordCounter {
    /// New counter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Count words in visible text nodes of the page body.
    ///
    /// Text is tokenized on whitespace; empty tokens are excluded.
    #[must_use]
    pub fn count(&self, page: &Page) -> usize {
        let body = page.document().select("body");
        let Some(root) = body.nodes().first() else {
            warn!("page has no body; word count defaults to 0");
            return 0;
        };

        let mut countable: HashMap<NodeId, bool> = HashMap::new();
        let mut total = 0;

        for node in root.descendants() {
            if !node.is_text() {
                continue;
            }
            let Some(parent) = node.parent() else {
                continue;
            };
            let counts = *countable.entry(parent.id).or_insert_with(|| {
                let parent_sel = Selection::from(parent);
                is_countable_parent(page, &parent_sel)
            });
            if counts {
                total += text::count_words(&node.text());
            }
        }

        debug!(words = total, "word count recomputed");
        total
    }

    /// Markup of the overlay badge showing `count`.
    #[must_use]
    pub fn render_badge(count: usize) -> String {
        let label = if count == 1 { "word" } else { "words" };
        format!(
            r#"<div id="{BADGE_ID}" class="page-inspector-badge" data-count="{count}" data-draggable="true" role="status" aria-live="polite" style="position:fixed;right:16px;bottom:16px;z-index:2147483647">{count} {label}</div>"#
        )
    }

    /// Write the badge into the page body, replacing any earlier badge.
    pub fn inject_badge(page: &Page, count: usize) {
        let doc = page.document();
        dom::remove(&doc.select(&format!("#{BADGE_ID}")));
        dom::append_html(&doc.select("body"), &Self::render_badge(count));
    }
}

fn is_countable_parent(page: &Page, parent: &Selection) -> bool {
    if dom::tag_name(parent).is_some_and(|t| UNCOUNTED_TAGS.contains(&t.as_str())) {
        return false;
    }
    if dom::attr(parent, "id").is_some_and(|id| id == BADGE_ID)
        || dom::ancestors(parent).iter().any(|a| dom::attr(a, "id").is_some_and(|id| id == BADGE_ID))
    {
        return false;
    }
    !dom::has_ancestor_tag(parent, UNCOUNTED_TAGS) && page.is_visible(parent)
}

/// Page events that may change the visible word count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The page scrolled.
    Scroll,
    /// The viewport was resized.
    Resize,
    /// The DOM changed.
    Mutation,
}

/// Keeps the badge count current while coalescing event bursts.
#[derive(Debug, Clone)]
pub struct WordCountMonitor {
    counter: WordCounter,
    debouncer: Debouncer<Trigger>,
    last_count: usize,
    last_trigger: Option<Trigger>,
}

impl WordCountMonitor {
    /// Monitor using `options.debounce_ms` as its quiet window.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            counter: WordCounter::new(),
            debouncer: Debouncer::new(Duration::from_millis(options.debounce_ms)),
            last_count: 0,
            last_trigger: None,
        }
    }

    /// Record an event; recomputation waits for the quiet window.
    pub fn on_event(&mut self, trigger: Trigger, now: Instant) {
        self.debouncer.trigger(now, trigger);
    }

    /// Recompute if the window has passed since the last event.
    ///
    /// Returns the new count when a recomputation ran. The badge in `page`
    /// is updated at the same time.
    pub fn poll(&mut self, now: Instant, page: &Page) -> Option<usize> {
        let trigger = self.debouncer.poll(now)?;
        let count = self.counter.count(page);
        WordCounter::inject_badge(page, count);
        self.last_count = count;
        self.last_trigger = Some(trigger);
        Some(count)
    }

    /// Most recent count (0 before the first recomputation).
    #[must_use]
    pub fn last_count(&self) -> usize {
        self.last_count
    }

    /// Event that caused the most recent recomputation.
    #[must_use]
    pub fn last_trigger(&self) -> Option<Trigger> {
        self.last_trigger
    }

    /// Number of recomputations so far.
    #[must_use]
    pub fn recompute_count(&self) -> usize {
        self.debouncer.fired()
    }

    /// When the pending recomputation is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}

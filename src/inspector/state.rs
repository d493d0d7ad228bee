//! Declarative view state of the inspector panel.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::finders::FinderKind;

/// Panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    /// Links by category.
    Links,
    /// Images by category.
    Images,
    /// Videos with previews.
    Videos,
    /// Detected tables.
    Tables,
    /// Ad-blocker toggles.
    AdblockerSettings,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: &'static [Self] = &[Tab::Links, Tab::Images, Tab::Videos, Tab::Tables, Tab::AdblockerSettings];

    /// Finder that fills this tab; `None` for the settings tab.
    #[must_use]
    pub fn finder(self) -> Option<FinderKind> {
        match self {
            Tab::Links => Some(FinderKind::Links),
            Tab::Images => Some(FinderKind::Images),
            Tab::Videos => Some(FinderKind::Videos),
            Tab::Tables => Some(FinderKind::Tables),
            Tab::AdblockerSettings => None,
        }
    }

    /// Stable identifier used in markup.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Tab::Links => "links",
            Tab::Images => "images",
            Tab::Videos => "videos",
            Tab::Tables => "tables",
            Tab::AdblockerSettings => "adblocker-settings",
        }
    }

    /// Tab caption.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Tab::Links => "Links",
            Tab::Images => "Images",
            Tab::Videos => "Videos",
            Tab::Tables => "Tables",
            Tab::AdblockerSettings => "Ad Blocker",
        }
    }
}

/// Load state of one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TabStatus {
    /// Never entered since the panel opened.
    NotLoaded,
    /// Scanned; `items` found at `scanned_at`.
    Loaded {
        /// Number of items found.
        items: usize,
        /// When the scan finished.
        scanned_at: DateTime<Utc>,
    },
}

/// Open/close lifecycle of the panel.
///
/// `Opening` and `Closing` last until the transition is reported finished;
/// open and close requests arriving meanwhile are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalPhase {
    /// Not shown.
    #[default]
    Closed,
    /// Fading in.
    Opening,
    /// Shown and interactive.
    Open,
    /// Fading out.
    Closing,
}

impl ModalPhase {
    /// Whether a transition is in flight.
    #[must_use]
    pub fn in_transition(self) -> bool {
        matches!(self, ModalPhase::Opening | ModalPhase::Closing)
    }

    /// Whether the panel is on screen.
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, ModalPhase::Closed)
    }
}

/// Everything the panel renders from, apart from scan results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Lifecycle phase.
    pub phase: ModalPhase,
    /// Selected tab.
    pub active_tab: Tab,
    /// Per-tab load state.
    pub tabs: BTreeMap<Tab, TabStatus>,
    /// Whether page scrolling is suspended while the panel is up.
    pub scroll_locked: bool,
    /// Last non-fatal problem shown inline in the panel.
    pub notice: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: ModalPhase::Closed,
            active_tab: Tab::Links,
            tabs: Tab::ALL.iter().map(|t| (*t, TabStatus::NotLoaded)).collect(),
            scroll_locked: false,
            notice: None,
        }
    }
}

impl ViewState {
    /// Load state of `tab`.
    #[must_use]
    pub fn status(&self, tab: Tab) -> TabStatus {
        self.tabs.get(&tab).copied().unwrap_or(TabStatus::NotLoaded)
    }

    /// Forget every tab's load state.
    pub fn reset_tabs(&mut self) {
        for status in self.tabs.values_mut() {
            *status = TabStatus::NotLoaded;
        }
    }
}

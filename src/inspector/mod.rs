//! Tabbed inspector panel.
//!
//! The inspector owns one finder per resource kind, handed in through
//! [`InspectorBuilder`], and a [`ScanCache`]. Tabs are filled lazily: the
//! first time a tab is selected for a page its finder runs, later visits
//! reuse the cached result until the tab is refreshed or the panel closes.
//!
//! Opening and closing go through a transition phase. While it lasts,
//! further open/close requests are ignored, so a double click cannot
//! toggle the panel twice.
//!
//! ```rust
//! use page_inspector::inspector::{Inspector, Tab};
//! use page_inspector::{Options, Page};
//!
//! let page = Page::from_html("<a href='/about'>About</a>", Some("https://site.com/"))?;
//! let mut inspector = Inspector::builder(&Options::default())
//!     .with_default_finders()
//!     .build()?;
//!
//! inspector.open();
//! inspector.finish_transition();
//! inspector.select_tab(&page, Tab::Links)?;
//! assert!(inspector.render().contains("https://site.com/about"));
//! # Ok::<(), page_inspector::Error>(())
//! ```

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::cache::{ScanCache, ScanOutput};
use crate::finders::{Finder, FinderKind, ImageFinder, LinkFinder, VideoFinder};
use crate::options::Options;
use crate::page::Page;
use crate::tables::TableFinder;
use crate::{Error, Result};

pub mod render;
pub mod settings;
pub mod state;

pub use settings::{AdblockSetting, AdblockSettings, JsonFileStore, MemoryStore, SettingsStore};
pub use state::{ModalPhase, Tab, TabStatus, ViewState};

/// Collects the inspector's collaborators.
///
/// `build` fails with `Error::NotReady` until every finder is registered.
#[derive(Default)]
pub struct InspectorBuilder {
    options: Options,
    links: Option<LinkFinder>,
    images: Option<ImageFinder>,
    videos: Option<VideoFinder>,
    tables: Option<TableFinder>,
    settings_store: Option<Box<dyn SettingsStore>>,
}

impl InspectorBuilder {
    /// Builder with no finders registered.
    #[must_use]
    pub fn new(options: &Options) -> Self {
        Self {
            options: options.clone(),
            ..Self::default()
        }
    }

    /// Register the link finder.
    #[must_use]
    pub fn links(mut self, finder: LinkFinder) -> Self {
        self.links = Some(finder);
        self
    }

    /// Register the image finder.
    #[must_use]
    pub fn images(mut self, finder: ImageFinder) -> Self {
        self.images = Some(finder);
        self
    }

    /// Register the video finder.
    #[must_use]
    pub fn videos(mut self, finder: VideoFinder) -> Self {
        self.videos = Some(finder);
        self
    }

    /// Register the table finder.
    #[must_use]
    pub fn tables(mut self, finder: TableFinder) -> Self {
        self.tables = Some(finder);
        self
    }

    /// Register every finder not registered yet, configured from the
    /// builder's options.
    #[must_use]
    pub fn with_default_finders(mut self) -> Self {
        let options = &self.options;
        self.links.get_or_insert_with(|| LinkFinder::new(options));
        self.images.get_or_insert_with(|| ImageFinder::new(options));
        self.videos.get_or_insert_with(|| VideoFinder::new(options));
        self.tables.get_or_insert_with(|| TableFinder::new(options));
        self
    }

    /// Where ad-blocker settings are read from and saved to.
    /// Defaults to a `MemoryStore`.
    #[must_use]
    pub fn settings_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings_store = Some(Box::new(store));
        self
    }

    /// Assemble the inspector.
    ///
    /// # Errors
    ///
    /// `Error::NotReady` naming the first missing finder, or the settings
    /// store's error if the stored settings cannot be read.
    pub fn build(self) -> Result<Inspector> {
        let links = self.links.ok_or(Error::NotReady("links"))?;
        let images = self.images.ok_or(Error::NotReady("images"))?;
        let videos = self.videos.ok_or(Error::NotReady("videos"))?;
        let tables = self.tables.ok_or(Error::NotReady("tables"))?;
        let settings_store = self
            .settings_store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let settings = settings_store.load()?;

        debug!("inspector ready");
        Ok(Inspector {
            links,
            images,
            videos,
            tables,
            settings_store,
            settings,
            cache: ScanCache::new(),
            state: ViewState::default(),
            page_key: None,
            scans_run: BTreeMap::new(),
        })
    }
}

/// The inspector panel: view state, finders and their cached results.
pub struct Inspector {
    links: LinkFinder,
    images: ImageFinder,
    videos: VideoFinder,
    tables: TableFinder,
    settings_store: Box<dyn SettingsStore>,
    settings: AdblockSettings,
    cache: ScanCache,
    state: ViewState,
    page_key: Option<String>,
    scans_run: BTreeMap<FinderKind, usize>,
}

impl std::fmt::Debug for Inspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspector")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("cached", &self.cache.len())
            .field("page_key", &self.page_key)
            .finish_non_exhaustive()
    }
}

impl Inspector {
    /// Start registering collaborators.
    #[must_use]
    pub fn builder(options: &Options) -> InspectorBuilder {
        InspectorBuilder::new(options)
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Current ad-blocker settings.
    #[must_use]
    pub fn settings(&self) -> &AdblockSettings {
        &self.settings
    }

    /// Cached scan results.
    #[must_use]
    pub fn cache(&self) -> &ScanCache {
        &self.cache
    }

    /// Whether an open or close transition is in flight.
    #[must_use]
    pub fn in_transition(&self) -> bool {
        self.state.phase.in_transition()
    }

    /// How many times `kind` has actually scanned a page.
    #[must_use]
    pub fn scans_run(&self, kind: FinderKind) -> usize {
        self.scans_run.get(&kind).copied().unwrap_or(0)
    }

    /// Show the panel and lock page scrolling.
    ///
    /// Returns `false` when the request was ignored: the panel is already
    /// open or a transition is in flight.
    pub fn open(&mut self) -> bool {
        if self.state.phase != ModalPhase::Closed {
            debug!(phase = ?self.state.phase, "open ignored");
            return false;
        }
        self.state.phase = ModalPhase::Opening;
        self.state.scroll_locked = true;
        self.state.notice = None;
        true
    }

    /// Hide the panel, drop every cached scan and release the scroll lock.
    ///
    /// Returns `false` when the request was ignored: the panel is not open
    /// or a transition is in flight.
    pub fn close(&mut self) -> bool {
        if self.state.phase != ModalPhase::Open {
            debug!(phase = ?self.state.phase, "close ignored");
            return false;
        }
        self.state.phase = ModalPhase::Closing;
        self.cache.clear_all();
        self.state.reset_tabs();
        self.state.scroll_locked = false;
        self.state.notice = None;
        self.page_key = None;
        info!("inspector closed; caches cleared");
        true
    }

    /// Complete the in-flight transition, if any.
    pub fn finish_transition(&mut self) {
        self.state.phase = match self.state.phase {
            ModalPhase::Opening => ModalPhase::Open,
            ModalPhase::Closing => ModalPhase::Closed,
            phase => phase,
        };
    }

    fn require_open(&self, action: &str) -> Result<()> {
        if self.state.phase == ModalPhase::Open {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {action} while the panel is {:?}",
                self.state.phase
            )))
        }
    }

    /// Switch to `tab`, scanning `page` if the tab has no result for it yet.
    ///
    /// # Errors
    ///
    /// `Error::InvalidState` unless the panel is open; the settings store's
    /// error when entering the settings tab fails to read them.
    pub fn select_tab(&mut self, page: &Page, tab: Tab) -> Result<()> {
        self.require_open("select a tab")?;
        self.state.active_tab = tab;
        self.state.notice = None;
        self.page_key = Some(page.cache_key());

        match tab.finder() {
            Some(kind) => self.ensure_scanned(page, tab, kind),
            None => self.reload_settings()?,
        }
        Ok(())
    }

    /// Rescan the active tab, or reread settings on the settings tab.
    ///
    /// # Errors
    ///
    /// Same as [`Inspector::select_tab`].
    pub fn refresh(&mut self, page: &Page) -> Result<()> {
        self.require_open("refresh")?;
        let tab = self.state.active_tab;
        self.page_key = Some(page.cache_key());

        match tab.finder() {
            Some(kind) => {
                self.cache.clear(kind);
                self.ensure_scanned(page, tab, kind);
            }
            None => self.reload_settings()?,
        }
        Ok(())
    }

    /// Flip an ad-blocker toggle and persist the result.
    ///
    /// Returns the new value. Settings are unchanged if saving fails.
    ///
    /// # Errors
    ///
    /// The settings store's error.
    pub fn toggle_setting(&mut self, setting: AdblockSetting) -> Result<bool> {
        let mut next = self.settings;
        let value = next.toggle(setting);
        if let Err(e) = self.settings_store.save(&next) {
            self.state.notice = Some(format!("An error occurred while saving settings: {e}"));
            return Err(e);
        }
        self.settings = next;
        info!(setting = setting.key(), value, "ad-blocker setting changed");
        Ok(value)
    }

    /// Cached result of `kind` for the page last shown.
    #[must_use]
    pub fn output(&self, kind: FinderKind) -> Option<&ScanOutput> {
        let key = self.page_key.as_deref()?;
        self.cache.get(kind, key).map(|entry| &entry.output)
    }

    /// Panel markup for the current state.
    #[must_use]
    pub fn render(&self) -> String {
        let active = self.state.active_tab.finder().and_then(|kind| self.output(kind));
        render::render_panel(&self.state, active, &self.settings)
    }

    fn reload_settings(&mut self) -> Result<()> {
        self.settings = self.settings_store.load()?;
        Ok(())
    }

    fn run_finder(&self, page: &Page, kind: FinderKind) -> ScanOutput {
        match kind {
            FinderKind::Links => ScanOutput::Links(self.links.find(page)),
            FinderKind::Images => ScanOutput::Images(self.images.find(page)),
            FinderKind::Videos => ScanOutput::Videos(self.videos.find(page)),
            FinderKind::Tables => ScanOutput::Tables(self.tables.find(page)),
        }
    }

    fn ensure_scanned(&mut self, page: &Page, tab: Tab, kind: FinderKind) {
        let key = page.cache_key();
        if !self.cache.contains(kind, &key) {
            let output = self.run_finder(page, kind);
            *self.scans_run.entry(kind).or_insert(0) += 1;
            self.cache.insert(&key, output);
        }

        let status = self
            .cache
            .get(kind, &key)
            .map_or(TabStatus::NotLoaded, |entry| TabStatus::Loaded {
                items: entry.output.len(),
                scanned_at: entry.scanned_at,
            });
        self.state.tabs.insert(tab, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><body>
        <a href="/a">A</a><a href="https://other.com/">Other</a>
        <img src="/photo.jpg" alt="photo">
        <table><tr><th>K</th><th>V</th></tr><tr><td>a</td><td>1</td></tr></table>
    </body></html>"#;

    fn page() -> Page {
        Page::from_html(HTML, Some("https://site.com/")).unwrap_or_else(|e| panic!("{e}"))
    }

    fn open_inspector() -> Inspector {
        let mut inspector = Inspector::builder(&Options::default())
            .with_default_finders()
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(inspector.open());
        inspector.finish_transition();
        inspector
    }

    #[test]
    fn test_build_requires_every_finder() {
        let options = Options::default();
        let err = Inspector::builder(&options)
            .links(LinkFinder::new(&options))
            .images(ImageFinder::new(&options))
            .build()
            .err();
        assert!(matches!(err, Some(Error::NotReady("videos"))));
    }

    #[test]
    fn test_open_ignored_during_transition() {
        let mut inspector = Inspector::builder(&Options::default())
            .with_default_finders()
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(inspector.open());
        assert!(inspector.in_transition());
        assert!(!inspector.open());
        assert!(!inspector.close());
        inspector.finish_transition();
        assert_eq!(inspector.state().phase, ModalPhase::Open);
        assert!(inspector.state().scroll_locked);
    }

    #[test]
    fn test_tabs_scan_lazily_once() {
        let mut inspector = open_inspector();
        let page = page();
        assert_eq!(inspector.scans_run(FinderKind::Links), 0);

        inspector.select_tab(&page, Tab::Links).unwrap_or_else(|e| panic!("{e}"));
        inspector.select_tab(&page, Tab::Tables).unwrap_or_else(|e| panic!("{e}"));
        inspector.select_tab(&page, Tab::Links).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(inspector.scans_run(FinderKind::Links), 1);
        assert_eq!(inspector.scans_run(FinderKind::Tables), 1);
        assert_eq!(inspector.scans_run(FinderKind::Images), 0);
        assert!(matches!(
            inspector.state().status(Tab::Links),
            TabStatus::Loaded { items: 2, .. }
        ));
    }

    #[test]
    fn test_refresh_rescans_active_tab_only() {
        let mut inspector = open_inspector();
        let page = page();
        inspector.select_tab(&page, Tab::Images).unwrap_or_else(|e| panic!("{e}"));
        inspector.select_tab(&page, Tab::Links).unwrap_or_else(|e| panic!("{e}"));
        inspector.refresh(&page).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(inspector.scans_run(FinderKind::Links), 2);
        assert_eq!(inspector.scans_run(FinderKind::Images), 1);
        assert!(inspector.cache().contains(FinderKind::Images, &page.cache_key()));
    }

    #[test]
    fn test_close_clears_caches_and_scroll_lock() {
        let mut inspector = open_inspector();
        let page = page();
        inspector.select_tab(&page, Tab::Links).unwrap_or_else(|e| panic!("{e}"));
        assert!(inspector.close());
        assert!(inspector.cache().is_empty());
        assert!(!inspector.state().scroll_locked);
        assert_eq!(inspector.state().status(Tab::Links), TabStatus::NotLoaded);

        inspector.finish_transition();
        assert_eq!(inspector.state().phase, ModalPhase::Closed);
        assert!(matches!(
            inspector.select_tab(&page, Tab::Links),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut inspector = open_inspector();
        let page = page();
        inspector.select_tab(&page, Tab::Tables).unwrap_or_else(|e| panic!("{e}"));
        let first = inspector.render();
        assert_eq!(first, inspector.render());
        assert!(first.contains("<th>K</th>"));
        assert_eq!(first.matches(r#"class="pi-modal""#).count(), 1);
    }

    #[test]
    fn test_toggle_setting_persists() {
        let mut inspector = Inspector::builder(&Options::default())
            .with_default_finders()
            .settings_store(MemoryStore::new())
            .build()
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(inspector.toggle_setting(AdblockSetting::HideCookieBanners).unwrap_or_else(|e| panic!("{e}")));
        assert!(inspector.settings().hide_cookie_banners);
    }
}

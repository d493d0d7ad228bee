//! Ad-blocker settings and their persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// One ad-blocker toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdblockSetting {
    /// Master switch.
    Enabled,
    /// Hide advertising elements.
    BlockAds,
    /// Block tracking scripts and pixels.
    BlockTrackers,
    /// Hide social share and follow widgets.
    BlockSocialWidgets,
    /// Dismiss cookie consent banners.
    HideCookieBanners,
}

impl AdblockSetting {
    /// Every setting, in display order.
    pub const ALL: &'static [Self] = &[
        AdblockSetting::Enabled,
        AdblockSetting::BlockAds,
        AdblockSetting::BlockTrackers,
        AdblockSetting::BlockSocialWidgets,
        AdblockSetting::HideCookieBanners,
    ];

    /// Storage key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            AdblockSetting::Enabled => "enabled",
            AdblockSetting::BlockAds => "block_ads",
            AdblockSetting::BlockTrackers => "block_trackers",
            AdblockSetting::BlockSocialWidgets => "block_social_widgets",
            AdblockSetting::HideCookieBanners => "hide_cookie_banners",
        }
    }

    /// Label shown next to the checkbox.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AdblockSetting::Enabled => "Enable ad blocker",
            AdblockSetting::BlockAds => "Block ads",
            AdblockSetting::BlockTrackers => "Block trackers",
            AdblockSetting::BlockSocialWidgets => "Block social widgets",
            AdblockSetting::HideCookieBanners => "Hide cookie banners",
        }
    }
}

impl FromStr for AdblockSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        AdblockSetting::ALL
            .iter()
            .copied()
            .find(|setting| setting.key() == key)
            .ok_or_else(|| Error::InvalidState(format!("unknown ad-blocker setting: {key}")))
    }
}

/// Stored ad-blocker preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AdblockSettings {
    /// Master switch.
    pub enabled: bool,
    /// Hide advertising elements.
    pub block_ads: bool,
    /// Block tracking scripts and pixels.
    pub block_trackers: bool,
    /// Hide social share and follow widgets.
    pub block_social_widgets: bool,
    /// Dismiss cookie consent banners.
    pub hide_cookie_banners: bool,
}

impl Default for AdblockSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            block_ads: true,
            block_trackers: true,
            block_social_widgets: false,
            hide_cookie_banners: false,
        }
    }
}

impl AdblockSettings {
    /// Current value of a toggle.
    #[must_use]
    pub fn get(&self, setting: AdblockSetting) -> bool {
        match setting {
            AdblockSetting::Enabled => self.enabled,
            AdblockSetting::BlockAds => self.block_ads,
            AdblockSetting::BlockTrackers => self.block_trackers,
            AdblockSetting::BlockSocialWidgets => self.block_social_widgets,
            AdblockSetting::HideCookieBanners => self.hide_cookie_banners,
        }
    }

    /// Set a toggle.
    pub fn set(&mut self, setting: AdblockSetting, value: bool) {
        let slot = match setting {
            AdblockSetting::Enabled => &mut self.enabled,
            AdblockSetting::BlockAds => &mut self.block_ads,
            AdblockSetting::BlockTrackers => &mut self.block_trackers,
            AdblockSetting::BlockSocialWidgets => &mut self.block_social_widgets,
            AdblockSetting::HideCookieBanners => &mut self.hide_cookie_banners,
        };
        *slot = value;
    }

    /// Flip a toggle and return its new value.
    pub fn toggle(&mut self, setting: AdblockSetting) -> bool {
        let value = !self.get(setting);
        self.set(setting, value);
        value
    }
}

/// Where ad-blocker settings live.
pub trait SettingsStore {
    /// Read the stored settings; defaults when nothing was stored yet.
    fn load(&self) -> Result<AdblockSettings>;

    /// Persist `settings`, replacing what was stored.
    fn save(&mut self, settings: &AdblockSettings) -> Result<()>;
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    settings: Option<AdblockSettings>,
    saves: usize,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `settings`.
    #[must_use]
    pub fn with(settings: AdblockSettings) -> Self {
        Self {
            settings: Some(settings),
            saves: 0,
        }
    }

    /// Number of `save` calls.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<AdblockSettings> {
        Ok(self.settings.unwrap_or_default())
    }

    fn save(&mut self, settings: &AdblockSettings) -> Result<()> {
        self.settings = Some(*settings);
        self.saves += 1;
        Ok(())
    }
}

/// Settings kept in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`; the file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<AdblockSettings> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file; using defaults");
                return Ok(AdblockSettings::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&data).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "settings file is not valid JSON");
            Error::from(e)
        })
    }

    fn save(&mut self, settings: &AdblockSettings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_parse() {
        let mut settings = AdblockSettings::default();
        let setting: AdblockSetting = "hide_cookie_banners".parse().unwrap_or_else(|e| panic!("{e}"));
        assert!(settings.toggle(setting));
        assert!(settings.hide_cookie_banners);
        assert!(!settings.toggle(setting));
        assert!(matches!("popups".parse::<AdblockSetting>(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_memory_store_defaults_then_saved() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().ok(), Some(AdblockSettings::default()));

        let mut settings = AdblockSettings::default();
        settings.enabled = false;
        store.save(&settings).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(store.load().ok(), Some(settings));
        assert_eq!(store.saves(), 1);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let mut store = JsonFileStore::new(dir.path().join("nested").join("adblock.json"));
        assert_eq!(store.load().ok(), Some(AdblockSettings::default()));

        let mut settings = AdblockSettings::default();
        settings.toggle(AdblockSetting::BlockSocialWidgets);
        store.save(&settings).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(JsonFileStore::new(store.path()).load().ok(), Some(settings));
    }

    #[test]
    fn test_json_file_store_partial_file() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("adblock.json");
        fs::write(&path, r#"{"block_ads": false}"#).unwrap_or_else(|e| panic!("{e}"));
        let loaded = JsonFileStore::new(&path).load().unwrap_or_else(|e| panic!("{e}"));
        assert!(!loaded.block_ads);
        assert!(loaded.enabled);
    }
}

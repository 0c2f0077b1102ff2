//! # Configuration Module
//!
//! Handles local configuration persistence and the fixed option tables shown on
//! the settings page.
//!
//! ## Configuration Storage
//! Local preferences are stored as JSON in:
//! `~/.config/wallpaper-remix/config.json`
//!
//! These are client-side knobs only (page sizes, where the cache lives, the
//! catalog endpoint). User-facing settings such as theme or language belong to
//! the host shell and are synchronized by the state container.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Directory name under the platform config/data directories.
pub const APP_DIR_NAME: &str = "wallpaper-remix";

/// A language the interface can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Locale code stored in settings (e.g., "en-US")
    pub value: &'static str,
    /// Human-readable name for display in the UI
    pub label: &'static str,
}

/// All available interface languages. The first entry is the fallback.
pub const LANGUAGES: &[Language] = &[
    Language { value: "en-US", label: "English" },
    Language { value: "hi-IN", label: "Hindi" },
    Language { value: "es-ES", label: "Spanish" },
    Language { value: "fr-FR", label: "French" },
    Language { value: "pt-BR", label: "Portuguese" },
    Language { value: "de-DE", label: "German" },
    Language { value: "ar-SA", label: "Arabic" },
];

/// A selectable auto-update interval.
#[derive(Debug, Clone, Copy)]
pub struct UpdateInterval {
    /// Interval in milliseconds, as stored in settings
    pub millis: u64,
    pub label: &'static str,
}

pub const UPDATE_INTERVALS: &[UpdateInterval] = &[
    UpdateInterval { millis: 60_000, label: "1 Minute" },
    UpdateInterval { millis: 1_800_000, label: "30 Minutes" },
    UpdateInterval { millis: 3_600_000, label: "1 Hour" },
    UpdateInterval { millis: 21_600_000, label: "6 Hours" },
    UpdateInterval { millis: 43_200_000, label: "12 Hours" },
    UpdateInterval { millis: 86_400_000, label: "Daily" },
    UpdateInterval { millis: 604_800_000, label: "Weekly" },
];

/// Theme choices as (value, label).
pub const THEME_OPTIONS: &[(&str, &str)] = &[
    ("system", "System"),
    ("light", "Light"),
    ("dark", "Dark"),
];

pub const RESOLUTIONS: &[&str] = &[
    "1366x768",
    "1440x900",
    "1600x900",
    "1920x1080",
    "2560x1440",
    "3840x2160",
];

/// Finds a language by its locale code.
pub fn find_language(value: &str) -> Option<Language> {
    LANGUAGES.iter().copied().find(|l| l.value == value)
}

/// Resolves a stored interval ("86400000" or a label such as "Daily") to seconds.
pub fn interval_secs(stored: &str) -> Option<u64> {
    let stored = stored.trim();
    if let Ok(millis) = stored.parse::<u64>() {
        return Some(millis / 1000);
    }
    UPDATE_INTERVALS
        .iter()
        .find(|i| i.label.eq_ignore_ascii_case(stored))
        .map(|i| i.millis / 1000)
}

/// How `load_more_wallpapers` merges the next page into the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMoreMode {
    /// The next page replaces the collection (same as a plain fetch)
    #[default]
    Replace,
    /// The next page is appended, skipping ids already present
    Append,
}

/// Local configuration for the application.
///
/// Persisted to `~/.config/wallpaper-remix/config.json` as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File name of the persisted state snapshot inside the data directory.
    pub store_file: String,
    /// Page size used by `load_more_wallpapers`.
    pub page_size: u32,
    /// Page size of the first fetch at startup.
    pub initial_page_size: u32,
    pub load_more_mode: LoadMoreMode,
    /// Wallpapers revealed per infinite-scroll step in a gallery.
    pub items_per_load: usize,
    /// Artificial delay before revealing the next gallery slice.
    pub scroll_delay_ms: u64,
    /// Window label passed to the host with rotation requests.
    pub rotation_window: String,
    /// Port the mock catalog API listens on.
    pub mock_api_port: u16,
    /// Where the catalog client reads wallpapers from.
    pub catalog_url: String,
}

impl Default for Config {
    /// Creates a default configuration.
    ///
    /// - `store_file`: "wallpaper-store.dat"
    /// - `page_size`: 100, `initial_page_size`: 10
    /// - `load_more_mode`: replace
    /// - `items_per_load`: 6 with a 500ms scroll delay
    /// - mock API on port 3000
    fn default() -> Self {
        Self {
            store_file: "wallpaper-store.dat".to_string(),
            page_size: 100,
            initial_page_size: 10,
            load_more_mode: LoadMoreMode::Replace,
            items_per_load: 6,
            scroll_delay_ms: 500,
            rotation_window: "main".to_string(),
            mock_api_port: 3000,
            catalog_url: "http://localhost:3000/api/wallpapers".to_string(),
        }
    }
}

/// Returns `~/.config/wallpaper-remix`.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR_NAME))
}

/// Returns `~/.local/share/wallpaper-remix`.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR_NAME))
}

impl Config {
    /// Returns the path to the configuration file.
    fn config_path() -> Option<PathBuf> {
        app_config_dir().map(|p| p.join("config.json"))
    }

    /// Loads the configuration from disk.
    ///
    /// If the config file doesn't exist or cannot be parsed, returns default values.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Like [`Config::load`], but writes the defaults out on first run so there
    /// is a file to edit.
    pub fn load_or_init() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if path.exists() {
            return Self::load();
        }

        let config = Self::default();
        match config.save() {
            Ok(()) => tracing::info!("wrote default config to {}", path.display()),
            Err(e) => tracing::warn!("{e}"),
        }
        config
    }

    fn load_from(path: &Path) -> Option<Self> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
    }

    /// Persists the current configuration to disk as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| AppError::Config("Could not determine config path".to_string()))?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create config dir: {e}")))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| AppError::Config(format!("Failed to write config: {e}")))?;

        Ok(())
    }

    /// Full path of the persisted state snapshot.
    pub fn store_path(&self) -> Result<PathBuf> {
        app_data_dir()
            .map(|dir| dir.join(&self.store_file))
            .ok_or_else(|| AppError::Config("Could not determine data directory".to_string()))
    }

    pub fn scroll_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.scroll_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.store_file, "wallpaper-store.dat");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.initial_page_size, 10);
        assert_eq!(config.load_more_mode, LoadMoreMode::Replace);
        assert_eq!(config.items_per_load, 6);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "page_size": 50, "load_more_mode": "append" }"#).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.load_more_mode, LoadMoreMode::Append);
        assert_eq!(config.mock_api_port, 3000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/config.json");
        let config = Config {
            page_size: 25,
            rotation_window: "gallery".into(),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();

        assert_eq!(reloaded.page_size, 25);
        assert_eq!(reloaded.rotation_window, "gallery");
        assert!(std::fs::read_to_string(&path).unwrap().contains("\n  \"page_size\": 25"));
    }

    #[test]
    fn test_unparsable_config_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "page_size = 5").unwrap();
        assert!(Config::load_from(&path).is_none());
    }

    #[test]
    fn test_languages_fallback_first() {
        assert_eq!(LANGUAGES.len(), 7);
        assert_eq!(LANGUAGES[0].value, "en-US");
        assert_eq!(find_language("de-DE").map(|l| l.label), Some("German"));
        assert!(find_language("xx-XX").is_none());
    }

    #[test]
    fn test_interval_secs() {
        assert_eq!(interval_secs("86400000"), Some(86_400));
        assert_eq!(interval_secs("Daily"), Some(86_400));
        assert_eq!(interval_secs("1 hour"), Some(3_600));
        assert_eq!(interval_secs("sometimes"), None);
    }
}

//! # Theme and Language Providers
//!
//! Resolve the effective color scheme and interface language from three
//! sources, highest priority first:
//!
//! 1. the synchronized settings from the host shell
//! 2. the local preference file (`~/.config/wallpaper-remix/preferences.json`)
//! 3. the platform default
//!
//! Changing either value writes the local preference and then pushes the new
//! value to the host through the state container.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::config::{app_config_dir, find_language, LANGUAGES};
use crate::error::{AppError, Result};
use crate::settings::{AppTheme, SettingCategory, SettingKey, Settings};
use crate::state::StateContainer;

/// Preferences remembered on this machine, independent of the host shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalPreferences {
    #[serde(default)]
    pub theme: Option<AppTheme>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl LocalPreferences {
    /// Default location of the preference file.
    pub fn default_path() -> Option<PathBuf> {
        app_config_dir().map(|p| p.join("preferences.json"))
    }

    /// Loads preferences, falling back to empty ones.
    pub fn load(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create preferences dir: {e}")))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| AppError::Config(format!("Failed to write preferences: {e}")))
    }
}

/// Preference file shared by both providers. Each write re-reads the file so
/// one provider never clobbers the other's field.
#[derive(Debug, Clone)]
struct PreferenceFile {
    path: Option<PathBuf>,
}

impl PreferenceFile {
    fn read(&self) -> LocalPreferences {
        self.path.as_deref().map(LocalPreferences::load).unwrap_or_default()
    }

    fn update(&self, change: impl FnOnce(&mut LocalPreferences)) {
        let Some(path) = &self.path else {
            return;
        };
        let mut prefs = LocalPreferences::load(path);
        change(&mut prefs);
        if let Err(e) = prefs.save(path) {
            tracing::warn!("failed to save local preferences: {e}");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Settings from the host, but only once they have actually been fetched.
fn loaded_settings(state: &StateContainer) -> Option<Settings> {
    let snapshot = state.snapshot();
    snapshot.settings_loaded.then_some(snapshot.settings)
}

// === Theme ===

/// Effective dark mode. `System` in settings counts as unset.
///
/// Note: a stored `system` theme falls through to the local preference and the
/// desktop's scheme instead of resolving straight to light.
pub fn resolve_dark_mode(
    settings: Option<&Settings>,
    local: Option<AppTheme>,
    platform_dark: bool,
) -> bool {
    let explicit = |theme: AppTheme| match theme {
        AppTheme::Dark => Some(true),
        AppTheme::Light => Some(false),
        AppTheme::System => None,
    };

    settings
        .and_then(|s| explicit(s.app_theme))
        .or_else(|| local.and_then(explicit))
        .unwrap_or(platform_dark)
}

pub struct ThemeProvider {
    state: Arc<StateContainer>,
    prefs: PreferenceFile,
    platform_dark: bool,
    dark: Mutex<bool>,
}

impl ThemeProvider {
    /// `platform_dark` is the desktop's own preference, see
    /// [`crate::host::system_prefers_dark`].
    pub fn new(
        state: Arc<StateContainer>,
        prefs_path: Option<PathBuf>,
        platform_dark: bool,
    ) -> Self {
        let prefs = PreferenceFile { path: prefs_path };
        let settings = loaded_settings(&state);
        let dark = resolve_dark_mode(settings.as_ref(), prefs.read().theme, platform_dark);
        Self { state, prefs, platform_dark, dark: Mutex::new(dark) }
    }

    pub fn is_dark_mode(&self) -> bool {
        *lock(&self.dark)
    }

    /// Re-derives the theme after settings changed.
    pub fn sync_from_settings(&self, settings: &Settings) {
        let dark = resolve_dark_mode(Some(settings), self.prefs.read().theme, self.platform_dark);
        *lock(&self.dark) = dark;
    }

    /// Switches the theme locally, remembers it, then pushes it to the host.
    ///
    /// The local value sticks even if the host rejects the update.
    pub async fn set_dark_mode(&self, dark: bool) -> Result<()> {
        let theme = if dark { AppTheme::Dark } else { AppTheme::Light };
        *lock(&self.dark) = dark;
        self.prefs.update(|p| p.theme = Some(theme));
        tracing::info!("theme set to {}", theme.as_str());

        self.state
            .update_setting(
                SettingKey::AppTheme,
                theme.as_str().into(),
                SettingCategory::Preferences,
            )
            .await
    }

    pub async fn toggle_dark_mode(&self) -> Result<()> {
        let dark = !self.is_dark_mode();
        self.set_dark_mode(dark).await
    }
}

// === Language ===

/// Effective language code. Unknown codes are skipped; the first entry of
/// [`LANGUAGES`] is the final fallback.
pub fn resolve_language(settings: Option<&Settings>, local: Option<&str>) -> &'static str {
    settings
        .map(|s| s.language.as_str())
        .into_iter()
        .chain(local)
        .find_map(find_language)
        .unwrap_or(LANGUAGES[0])
        .value
}

pub struct LanguageProvider {
    state: Arc<StateContainer>,
    prefs: PreferenceFile,
    language: Mutex<&'static str>,
}

impl LanguageProvider {
    pub fn new(state: Arc<StateContainer>, prefs_path: Option<PathBuf>) -> Self {
        let prefs = PreferenceFile { path: prefs_path };
        let settings = loaded_settings(&state);
        let language = resolve_language(settings.as_ref(), prefs.read().lang.as_deref());
        Self { state, prefs, language: Mutex::new(language) }
    }

    pub fn language(&self) -> &'static str {
        *lock(&self.language)
    }

    /// Human-readable name of the current language.
    pub fn label(&self) -> &'static str {
        find_language(self.language()).unwrap_or(LANGUAGES[0]).label
    }

    pub fn sync_from_settings(&self, settings: &Settings) {
        let language = resolve_language(Some(settings), self.prefs.read().lang.as_deref());
        *lock(&self.language) = language;
    }

    /// Switches the language locally, remembers it, then pushes it to the host.
    pub async fn set_language(&self, value: &str) -> Result<()> {
        let language = find_language(value)
            .ok_or_else(|| AppError::InvalidArguments(format!("Unsupported language: {value}")))?
            .value;

        *lock(&self.language) = language;
        self.prefs.update(|p| p.lang = Some(language.to_string()));
        tracing::info!("language set to {language}");

        self.state
            .update_setting(SettingKey::Language, language.into(), SettingCategory::General)
            .await
    }
}

//! # Settings Model
//!
//! User preferences as a fixed set of named keys with typed values.
//!
//! The host shell keeps settings as a flat string table, so values coming back
//! from `get_app_settings` may be stringified (`"true"` instead of `true`).
//! [`Settings::from_raw`] normalizes that shape before anything trusts it;
//! going the other way, [`SettingValue::to_wire`] produces the string the host
//! stores.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::config::{interval_secs, RESOLUTIONS, THEME_OPTIONS};
use crate::error::{AppError, Result};

/// Raw settings exactly as the bridge returned them.
pub type RawSettings = serde_json::Map<String, Value>;

/// Application color theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    Light,
    Dark,
    /// Follow the desktop's color scheme
    #[default]
    System,
}

impl AppTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            AppTheme::Light => "light",
            AppTheme::Dark => "dark",
            AppTheme::System => "system",
        }
    }
}

impl FromStr for AppTheme {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(AppTheme::Light),
            "dark" => Ok(AppTheme::Dark),
            "system" => Ok(AppTheme::System),
            other => Err(AppError::InvalidArguments(format!("Unknown theme: {other}"))),
        }
    }
}

/// The full preference set. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_update: bool,
    pub save_wallpaper: bool,
    pub update_interval: String,
    pub app_theme: AppTheme,
    pub notifications: bool,
    pub auto_start: bool,
    pub experimental: bool,
    pub language: String,
    pub preferred_resolution: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_update: true,
            save_wallpaper: false,
            update_interval: "Daily".to_string(),
            app_theme: AppTheme::System,
            notifications: true,
            auto_start: false,
            experimental: false,
            language: "en-US".to_string(),
            preferred_resolution: "1920x1080".to_string(),
        }
    }
}

/// Names of the individual settings, as the host shell knows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    AutoUpdate,
    SaveWallpaper,
    UpdateInterval,
    AppTheme,
    Notifications,
    AutoStart,
    Experimental,
    Language,
    PreferredResolution,
}

/// What kind of value a key holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Text,
    Theme,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        SettingKey::AutoUpdate,
        SettingKey::SaveWallpaper,
        SettingKey::UpdateInterval,
        SettingKey::AppTheme,
        SettingKey::Notifications,
        SettingKey::AutoStart,
        SettingKey::Experimental,
        SettingKey::Language,
        SettingKey::PreferredResolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::AutoUpdate => "autoUpdate",
            SettingKey::SaveWallpaper => "saveWallpaper",
            SettingKey::UpdateInterval => "updateInterval",
            SettingKey::AppTheme => "appTheme",
            SettingKey::Notifications => "notifications",
            SettingKey::AutoStart => "autoStart",
            SettingKey::Experimental => "experimental",
            SettingKey::Language => "language",
            SettingKey::PreferredResolution => "preferredResolution",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            SettingKey::AutoUpdate
            | SettingKey::SaveWallpaper
            | SettingKey::Notifications
            | SettingKey::AutoStart
            | SettingKey::Experimental => ValueKind::Bool,
            SettingKey::AppTheme => ValueKind::Theme,
            SettingKey::UpdateInterval
            | SettingKey::Language
            | SettingKey::PreferredResolution => ValueKind::Text,
        }
    }

    /// The category the settings page files this key under.
    pub fn default_category(self) -> SettingCategory {
        match self {
            SettingKey::AutoUpdate
            | SettingKey::SaveWallpaper
            | SettingKey::UpdateInterval
            | SettingKey::PreferredResolution => SettingCategory::Wallpaper,
            SettingKey::AppTheme
            | SettingKey::Notifications
            | SettingKey::AutoStart
            | SettingKey::Experimental => SettingCategory::Preferences,
            SettingKey::Language => SettingCategory::General,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| AppError::InvalidArguments(format!("Unknown setting: {s}")))
    }
}

/// Grouping tag stored next to each setting by the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingCategory {
    Wallpaper,
    Preferences,
    General,
}

impl SettingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SettingCategory::Wallpaper => "wallpaper",
            SettingCategory::Preferences => "preferences",
            SettingCategory::General => "general",
        }
    }
}

/// A value for one setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// Encodes the value for `update_app_setting_command`: text is sent raw,
    /// anything else JSON-encoded.
    pub fn to_wire(&self) -> String {
        match self {
            SettingValue::Text(s) => s.clone(),
            SettingValue::Bool(b) => Value::Bool(*b).to_string(),
        }
    }

    /// Parses user input (e.g. from the command line) for the given key.
    pub fn parse_for(key: SettingKey, input: &str) -> Result<Self> {
        match key.kind() {
            ValueKind::Bool => match input.trim() {
                "true" => Ok(SettingValue::Bool(true)),
                "false" => Ok(SettingValue::Bool(false)),
                other => Err(AppError::InvalidArguments(format!(
                    "{key} expects true or false, got {other:?}"
                ))),
            },
            ValueKind::Theme => {
                let theme: AppTheme = input.parse().map_err(|_| {
                    let options: Vec<&str> =
                        THEME_OPTIONS.iter().map(|(value, _)| *value).collect();
                    AppError::InvalidArguments(format!(
                        "{key} expects one of {}, got {input:?}",
                        options.join(", ")
                    ))
                })?;
                Ok(SettingValue::Text(theme.as_str().to_string()))
            }
            ValueKind::Text => match key {
                // Stored as milliseconds; labels such as "Daily" are accepted too
                SettingKey::UpdateInterval => interval_secs(input)
                    .filter(|secs| *secs > 0)
                    .map(|secs| SettingValue::Text((secs * 1000).to_string()))
                    .ok_or_else(|| {
                        AppError::InvalidArguments(format!("Unknown update interval: {input:?}"))
                    }),
                SettingKey::PreferredResolution => RESOLUTIONS
                    .iter()
                    .find(|r| **r == input.trim())
                    .map(|r| SettingValue::Text(r.to_string()))
                    .ok_or_else(|| {
                        AppError::InvalidArguments(format!(
                            "{key} expects one of {}, got {input:?}",
                            RESOLUTIONS.join(", ")
                        ))
                    }),
                _ => Ok(SettingValue::Text(input.to_string())),
            },
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

/// Truthy-string normalization: native `true` or the literal `"true"`.
pub fn normalize_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Settings {
    /// Builds settings from the bridge's raw table.
    ///
    /// Missing keys keep their defaults; present boolean keys go through
    /// [`normalize_bool`], so anything other than `true`/`"true"` is false.
    pub fn from_raw(raw: &RawSettings) -> Self {
        let mut settings = Settings::default();
        for key in SettingKey::ALL {
            let Some(value) = raw.get(key.as_str()) else {
                continue;
            };
            let normalized = match key.kind() {
                ValueKind::Bool => SettingValue::Bool(normalize_bool(value)),
                ValueKind::Text => match text_value(value) {
                    Some(s) => SettingValue::Text(s),
                    None => continue,
                },
                ValueKind::Theme => {
                    let theme = value
                        .as_str()
                        .and_then(|s| s.parse::<AppTheme>().ok())
                        .unwrap_or_default();
                    SettingValue::Text(theme.as_str().to_string())
                }
            };
            // kinds were matched above, so this cannot be rejected
            let _ = settings.apply(key, normalized);
        }
        settings
    }

    /// Reads one setting.
    pub fn get(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::AutoUpdate => self.auto_update.into(),
            SettingKey::SaveWallpaper => self.save_wallpaper.into(),
            SettingKey::UpdateInterval => self.update_interval.clone().into(),
            SettingKey::AppTheme => self.app_theme.as_str().into(),
            SettingKey::Notifications => self.notifications.into(),
            SettingKey::AutoStart => self.auto_start.into(),
            SettingKey::Experimental => self.experimental.into(),
            SettingKey::Language => self.language.clone().into(),
            SettingKey::PreferredResolution => self.preferred_resolution.clone().into(),
        }
    }

    /// Checks that `value` fits `key` without changing anything.
    pub fn validate(key: SettingKey, value: &SettingValue) -> Result<()> {
        match (key.kind(), value) {
            (ValueKind::Bool, SettingValue::Bool(_)) | (ValueKind::Text, SettingValue::Text(_)) => {
                Ok(())
            }
            (ValueKind::Theme, SettingValue::Text(s)) => s.parse::<AppTheme>().map(|_| ()),
            _ => Err(AppError::InvalidArguments(format!(
                "Value {value:?} does not fit setting {key}"
            ))),
        }
    }

    /// Writes one setting, rejecting values of the wrong kind.
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<()> {
        Self::validate(key, &value)?;
        match (key, value) {
            (SettingKey::AutoUpdate, SettingValue::Bool(b)) => self.auto_update = b,
            (SettingKey::SaveWallpaper, SettingValue::Bool(b)) => self.save_wallpaper = b,
            (SettingKey::Notifications, SettingValue::Bool(b)) => self.notifications = b,
            (SettingKey::AutoStart, SettingValue::Bool(b)) => self.auto_start = b,
            (SettingKey::Experimental, SettingValue::Bool(b)) => self.experimental = b,
            (SettingKey::UpdateInterval, SettingValue::Text(s)) => self.update_interval = s,
            (SettingKey::Language, SettingValue::Text(s)) => self.language = s,
            (SettingKey::PreferredResolution, SettingValue::Text(s)) => {
                self.preferred_resolution = s
            }
            (SettingKey::AppTheme, SettingValue::Text(s)) => self.app_theme = s.parse()?,
            _ => unreachable!("validated above"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawSettings {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_bool() {
        assert!(normalize_bool(&json!(true)));
        assert!(normalize_bool(&json!("true")));
        assert!(!normalize_bool(&json!(false)));
        assert!(!normalize_bool(&json!("false")));
        assert!(!normalize_bool(&json!("")));
        assert!(!normalize_bool(&json!("0")));
        assert!(!normalize_bool(&json!("TRUE")));
        assert!(!normalize_bool(&json!(1)));
        assert!(!normalize_bool(&Value::Null));
    }

    #[test]
    fn test_from_raw_stringified_booleans() {
        let settings = Settings::from_raw(&raw(json!({
            "autoStart": "true",
            "autoUpdate": "false",
            "notifications": "0",
            "experimental": true,
            "saveWallpaper": "",
        })));
        assert!(settings.auto_start);
        assert!(!settings.auto_update);
        assert!(!settings.notifications);
        assert!(settings.experimental);
        assert!(!settings.save_wallpaper);
    }

    #[test]
    fn test_from_raw_missing_keys_keep_defaults() {
        let settings = Settings::from_raw(&RawSettings::new());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_raw_text_and_theme() {
        let settings = Settings::from_raw(&raw(json!({
            "updateInterval": 86400000,
            "appTheme": "dark",
            "language": "fr-FR",
            "preferredResolution": "2560x1440",
        })));
        assert_eq!(settings.update_interval, "86400000");
        assert_eq!(settings.app_theme, AppTheme::Dark);
        assert_eq!(settings.language, "fr-FR");
        assert_eq!(settings.preferred_resolution, "2560x1440");
    }

    #[test]
    fn test_from_raw_unknown_theme_falls_back_to_system() {
        let settings = Settings::from_raw(&raw(json!({ "appTheme": "sepia" })));
        assert_eq!(settings.app_theme, AppTheme::System);
    }

    #[test]
    fn test_wire_encoding() {
        assert_eq!(SettingValue::Bool(true).to_wire(), "true");
        assert_eq!(SettingValue::Bool(false).to_wire(), "false");
        assert_eq!(SettingValue::from("dark").to_wire(), "dark");
    }

    #[test]
    fn test_apply_rejects_wrong_kind() {
        let mut settings = Settings::default();
        assert!(settings.apply(SettingKey::AutoStart, "yes".into()).is_err());
        assert!(settings.apply(SettingKey::Language, true.into()).is_err());
        assert!(settings.apply(SettingKey::AppTheme, "sepia".into()).is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_apply_and_get() {
        let mut settings = Settings::default();
        settings.apply(SettingKey::AppTheme, "dark".into()).unwrap();
        settings.apply(SettingKey::AutoStart, true.into()).unwrap();
        assert_eq!(settings.app_theme, AppTheme::Dark);
        assert_eq!(settings.get(SettingKey::AutoStart), SettingValue::Bool(true));
        assert_eq!(settings.get(SettingKey::AppTheme), SettingValue::Text("dark".into()));
    }

    #[test]
    fn test_key_round_trip_names() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
        assert!("wallpaperDir".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_parse_for_validates_input() {
        assert_eq!(
            SettingValue::parse_for(SettingKey::Notifications, "false").unwrap(),
            SettingValue::Bool(false)
        );
        assert!(SettingValue::parse_for(SettingKey::Notifications, "off").is_err());
        assert_eq!(
            SettingValue::parse_for(SettingKey::AppTheme, "Dark").unwrap(),
            SettingValue::Text("dark".into())
        );
    }

    #[test]
    fn test_parse_for_checks_option_tables() {
        assert_eq!(
            SettingValue::parse_for(SettingKey::UpdateInterval, "Daily").unwrap(),
            SettingValue::Text("86400000".into())
        );
        assert_eq!(
            SettingValue::parse_for(SettingKey::UpdateInterval, "3600000").unwrap(),
            SettingValue::Text("3600000".into())
        );
        assert!(SettingValue::parse_for(SettingKey::UpdateInterval, "sometimes").is_err());
        assert!(SettingValue::parse_for(SettingKey::UpdateInterval, "0").is_err());

        assert_eq!(
            SettingValue::parse_for(SettingKey::PreferredResolution, " 2560x1440 ").unwrap(),
            SettingValue::Text("2560x1440".into())
        );
        let err = SettingValue::parse_for(SettingKey::PreferredResolution, "800x600").unwrap_err();
        assert!(err.to_string().contains("3840x2160"));

        let err = SettingValue::parse_for(SettingKey::AppTheme, "sepia").unwrap_err();
        assert!(err.to_string().contains("system, light, dark"));
    }

    #[test]
    fn test_settings_serialize_camel_case() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["appTheme"], "system");
        assert_eq!(json["preferredResolution"], "1920x1080");
        assert_eq!(json["autoUpdate"], true);
    }
}

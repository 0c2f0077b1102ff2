//! # Bridge Client
//!
//! The host shell owns the filesystem, the wallpaper database and the desktop
//! integration; this crate reaches all of it through named commands. [`Bridge`]
//! is that command surface. Each method is one command and resolves once the
//! host answers.
//!
//! The production implementation is [`crate::dbus_client::DbusBridge`].

use async_trait::async_trait;

use crate::error::Result;
use crate::settings::RawSettings;
use crate::wallpaper::Wallpaper;

#[async_trait]
pub trait Bridge: Send + Sync {
    /// `get_wallpapers`: one page of the collection.
    async fn get_wallpapers(&self, limit: u32, offset: u32) -> Result<Vec<Wallpaper>>;

    /// `update_favorite_command`: set or clear the favorite flag.
    async fn update_favorite(&self, id: &str, is_favorite: bool) -> Result<()>;

    /// `delete_favorite_wallpaper_command`
    async fn delete_favorite_wallpaper(&self, id: &str) -> Result<()>;

    /// `fetch_favorite_wallpapers`
    async fn fetch_favorite_wallpapers(&self) -> Result<Vec<Wallpaper>>;

    /// `get_app_settings`: raw table, values possibly stringified.
    async fn get_app_settings(&self) -> Result<RawSettings>;

    /// `update_app_setting_command`
    async fn update_app_setting(&self, key: &str, value: &str, category: &str) -> Result<()>;

    /// `reset_wallpaper_settings`
    async fn reset_wallpaper_settings(&self) -> Result<()>;

    /// `apply_wallpaper`: URL or local path.
    async fn apply_wallpaper(&self, image_url: &str) -> Result<()>;

    /// `download_wallpaper`: returns where the host saved the file.
    async fn download_wallpaper(&self, url: &str, filename: &str) -> Result<String>;

    /// `start_wallpaper_rotation`
    async fn start_wallpaper_rotation(
        &self,
        paths: &[String],
        interval_sec: u64,
        window: &str,
    ) -> Result<()>;

    /// `stop_wallpaper_rotation`
    async fn stop_wallpaper_rotation(&self) -> Result<()>;

    /// `get_wallpaper_count_command`
    async fn wallpaper_count(&self) -> Result<u32>;

    /// `prune_wallpaper_db_command`: keep favorites plus the newest `keep`.
    async fn prune_wallpapers(&self, keep: u32) -> Result<()>;
}

/// In-memory bridge for tests. Behaves like the host shell's database: a
/// fixed collection, a favorites set and a string settings table.
#[cfg(test)]
pub mod fake {
    use super::*;
    use crate::error::AppError;
    use serde_json::Value;
    use std::collections::{BTreeSet, HashSet};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct FakeState {
        pub wallpapers: Vec<Wallpaper>,
        pub favorites: BTreeSet<String>,
        pub settings: RawSettings,
        /// Commands that should fail, by command name
        pub failing: HashSet<&'static str>,
        /// Every command received, in order
        pub calls: Vec<String>,
        pub rotation: Option<(Vec<String>, u64, String)>,
    }

    #[derive(Debug, Default)]
    pub struct FakeBridge {
        pub state: Mutex<FakeState>,
    }

    impl FakeBridge {
        pub fn with_wallpapers(wallpapers: Vec<Wallpaper>) -> Self {
            let bridge = Self::default();
            bridge.state.lock().unwrap().wallpapers = wallpapers;
            bridge
        }

        pub fn set_setting(&self, key: &str, value: Value) {
            self.state.lock().unwrap().settings.insert(key.to_string(), value);
        }

        pub fn fail(&self, command: &'static str) {
            self.state.lock().unwrap().failing.insert(command);
        }

        pub fn recover(&self, command: &'static str) {
            self.state.lock().unwrap().failing.remove(command);
        }

        pub fn calls(&self) -> Vec<String> {
            self.state.lock().unwrap().calls.clone()
        }

        fn enter(
            &self,
            command: &'static str,
            detail: String,
        ) -> Result<std::sync::MutexGuard<'_, FakeState>> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(if detail.is_empty() {
                command.to_string()
            } else {
                format!("{command} {detail}")
            });
            if state.failing.contains(command) {
                return Err(AppError::Bridge(format!("{command} failed")));
            }
            Ok(state)
        }

        fn with_flags(state: &FakeState, wp: &Wallpaper) -> Wallpaper {
            let mut wp = wp.clone();
            wp.is_favorite = Some(state.favorites.contains(&wp.id));
            wp
        }
    }

    #[async_trait]
    impl Bridge for FakeBridge {
        async fn get_wallpapers(&self, limit: u32, offset: u32) -> Result<Vec<Wallpaper>> {
            let state = self.enter("get_wallpapers", format!("{limit} {offset}"))?;
            Ok(state
                .wallpapers
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|wp| Self::with_flags(&state, wp))
                .collect())
        }

        async fn update_favorite(&self, id: &str, is_favorite: bool) -> Result<()> {
            let mut state = self.enter("update_favorite_command", format!("{id} {is_favorite}"))?;
            if is_favorite {
                state.favorites.insert(id.to_string());
            } else {
                state.favorites.remove(id);
            }
            Ok(())
        }

        async fn delete_favorite_wallpaper(&self, id: &str) -> Result<()> {
            let mut state = self.enter("delete_favorite_wallpaper_command", id.to_string())?;
            state.favorites.remove(id);
            Ok(())
        }

        async fn fetch_favorite_wallpapers(&self) -> Result<Vec<Wallpaper>> {
            let state = self.enter("fetch_favorite_wallpapers", String::new())?;
            Ok(state
                .wallpapers
                .iter()
                .filter(|wp| state.favorites.contains(&wp.id))
                .map(|wp| Self::with_flags(&state, wp))
                .collect())
        }

        async fn get_app_settings(&self) -> Result<RawSettings> {
            let state = self.enter("get_app_settings", String::new())?;
            Ok(state.settings.clone())
        }

        async fn update_app_setting(&self, key: &str, value: &str, category: &str) -> Result<()> {
            let mut state =
                self.enter("update_app_setting_command", format!("{key}={value} [{category}]"))?;
            state.settings.insert(key.to_string(), Value::String(value.to_string()));
            Ok(())
        }

        async fn reset_wallpaper_settings(&self) -> Result<()> {
            let mut state = self.enter("reset_wallpaper_settings", String::new())?;
            state.settings.clear();
            for (key, value) in [
                ("autoUpdate", "true"),
                ("saveWallpaper", "false"),
                ("updateInterval", "86400000"),
                ("appTheme", "system"),
                ("notifications", "true"),
                ("autoStart", "false"),
                ("experimental", "false"),
                ("language", "en-US"),
            ] {
                state.settings.insert(key.to_string(), Value::String(value.to_string()));
            }
            Ok(())
        }

        async fn apply_wallpaper(&self, image_url: &str) -> Result<()> {
            self.enter("apply_wallpaper", image_url.to_string())?;
            Ok(())
        }

        async fn download_wallpaper(&self, url: &str, filename: &str) -> Result<String> {
            self.enter("download_wallpaper", format!("{url} {filename}"))?;
            Ok(format!("/home/user/Downloads/{filename}"))
        }

        async fn start_wallpaper_rotation(
            &self,
            paths: &[String],
            interval_sec: u64,
            window: &str,
        ) -> Result<()> {
            let mut state = self.enter("start_wallpaper_rotation", format!("{interval_sec}"))?;
            state.rotation = Some((paths.to_vec(), interval_sec, window.to_string()));
            Ok(())
        }

        async fn stop_wallpaper_rotation(&self) -> Result<()> {
            let mut state = self.enter("stop_wallpaper_rotation", String::new())?;
            state.rotation = None;
            Ok(())
        }

        async fn wallpaper_count(&self) -> Result<u32> {
            let state = self.enter("get_wallpaper_count_command", String::new())?;
            Ok(state.wallpapers.len() as u32)
        }

        async fn prune_wallpapers(&self, keep: u32) -> Result<()> {
            let mut state = self.enter("prune_wallpaper_db_command", keep.to_string())?;
            let favorites = state.favorites.clone();
            let mut kept = 0usize;
            state.wallpapers.retain(|wp| {
                if favorites.contains(&wp.id) {
                    return true;
                }
                kept += 1;
                kept <= keep as usize
            });
            Ok(())
        }
    }
}
